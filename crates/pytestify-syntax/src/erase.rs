//! Opaque scopes.
//!
//! Bodies of `class` declarations and `def name(self, ...)` helpers belong to
//! the user, not to mamba. Anything inside them that happens to look like a
//! header is downgraded to plain code.

use crate::lines::Line;

/// Downgrade every line nested inside an opaque scope to plain code.
///
/// A `class` opener is itself passed on as plain code. A method header stays a
/// method header so the tree builder can hoist it, but its body is opaque.
#[must_use]
pub fn erase_opaque_scopes(lines: Vec<Line>) -> Vec<Line> {
    let mut scope: Option<usize> = None;
    let mut out = Vec::with_capacity(lines.len());

    for line in lines {
        if matches!(line, Line::Codeless(_)) {
            out.push(line);
            continue;
        }
        if scope.is_some_and(|indent| line.indent() > indent) {
            out.push(line.into_code());
            continue;
        }

        scope = None;
        match line {
            Line::Opaque(_) => {
                scope = Some(line.indent());
                out.push(line.into_code());
            }
            Line::Method(_) => {
                scope = Some(line.indent());
                out.push(line);
            }
            Line::Codeless(_) | Line::Code(_) | Line::Header(_) => out.push(line),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lines::classify;

    fn kinds(lines: &[Line]) -> Vec<&'static str> {
        lines
            .iter()
            .map(|line| match line {
                Line::Codeless(_) => "blank",
                Line::Code(_) => "code",
                Line::Opaque(_) => "opaque",
                Line::Header(_) => "header",
                Line::Method(_) => "method",
            })
            .collect()
    }

    #[test]
    fn test_class_body_is_erased() {
        let source = "\
class Helper:
    with it('not a test'):

        def run(self):
            pass
with it('real'):
    pass
";
        let lines = erase_opaque_scopes(classify(source).unwrap());
        assert_eq!(
            kinds(&lines),
            vec!["code", "code", "blank", "code", "code", "header", "code"]
        );
    }

    #[test]
    fn test_method_header_survives_but_body_is_erased() {
        let source = "\
with description('a') as self:
    def helper(self):
        with it('hidden'):
            pass
    with it('visible'):
        self.helper()
";
        let lines = erase_opaque_scopes(classify(source).unwrap());
        assert_eq!(
            kinds(&lines),
            vec!["header", "method", "code", "code", "header", "code"]
        );
    }

    #[test]
    fn test_nested_class_inside_method_stays_code() {
        let source = "\
def helper(self):
    class Inner:
        pass
x = 1
";
        let lines = erase_opaque_scopes(classify(source).unwrap());
        assert_eq!(kinds(&lines), vec!["method", "code", "code", "code"]);
    }
}
