//! Renders inline TeX as plain Unicode text.
//!
//! Only the math segments (`$…$`, `$$…$$`, `\(…\)`, `\[…\]`) are rewritten;
//! everything outside them is copied through. Commands without a Unicode
//! equivalent are kept verbatim. A `$` before a digit or space is a price,
//! not a delimiter; `\$` is always a literal dollar.

use super::{MathError, MathFormatter};

#[derive(Clone, Copy, Debug, Default)]
pub struct UnicodeMath;

const DELIMITERS: [(&str, &str); 4] = [("$$", "$$"), ("$", "$"), ("\\(", "\\)"), ("\\[", "\\]")];

const SYMBOLS: &[(&str, &str)] = &[
    ("alpha", "α"),
    ("beta", "β"),
    ("gamma", "γ"),
    ("delta", "δ"),
    ("epsilon", "ε"),
    ("varepsilon", "ε"),
    ("zeta", "ζ"),
    ("eta", "η"),
    ("theta", "θ"),
    ("iota", "ι"),
    ("kappa", "κ"),
    ("lambda", "λ"),
    ("mu", "μ"),
    ("nu", "ν"),
    ("xi", "ξ"),
    ("pi", "π"),
    ("rho", "ρ"),
    ("sigma", "σ"),
    ("tau", "τ"),
    ("phi", "φ"),
    ("varphi", "φ"),
    ("chi", "χ"),
    ("psi", "ψ"),
    ("omega", "ω"),
    ("Gamma", "Γ"),
    ("Delta", "Δ"),
    ("Theta", "Θ"),
    ("Lambda", "Λ"),
    ("Xi", "Ξ"),
    ("Pi", "Π"),
    ("Sigma", "Σ"),
    ("Phi", "Φ"),
    ("Psi", "Ψ"),
    ("Omega", "Ω"),
    ("times", "×"),
    ("cdot", "·"),
    ("div", "÷"),
    ("pm", "±"),
    ("mp", "∓"),
    ("leq", "≤"),
    ("le", "≤"),
    ("geq", "≥"),
    ("ge", "≥"),
    ("neq", "≠"),
    ("ne", "≠"),
    ("approx", "≈"),
    ("equiv", "≡"),
    ("sim", "∼"),
    ("propto", "∝"),
    ("infty", "∞"),
    ("partial", "∂"),
    ("nabla", "∇"),
    ("sum", "∑"),
    ("prod", "∏"),
    ("int", "∫"),
    ("oint", "∮"),
    ("to", "→"),
    ("rightarrow", "→"),
    ("leftarrow", "←"),
    ("Rightarrow", "⇒"),
    ("Leftarrow", "⇐"),
    ("iff", "⇔"),
    ("implies", "⇒"),
    ("in", "∈"),
    ("notin", "∉"),
    ("subset", "⊂"),
    ("subseteq", "⊆"),
    ("cup", "∪"),
    ("cap", "∩"),
    ("emptyset", "∅"),
    ("forall", "∀"),
    ("exists", "∃"),
    ("neg", "¬"),
    ("land", "∧"),
    ("lor", "∨"),
    ("circ", "∘"),
    ("degree", "°"),
    ("ldots", "…"),
    ("cdots", "⋯"),
    ("sin", "sin"),
    ("cos", "cos"),
    ("tan", "tan"),
    ("log", "log"),
    ("ln", "ln"),
    ("exp", "exp"),
    ("lim", "lim"),
    ("max", "max"),
    ("min", "min"),
];

/// Commands whose single argument is shown as-is.
const TEXT_COMMANDS: &[&str] = &[
    "text",
    "mathrm",
    "mathbf",
    "mathit",
    "operatorname",
    "textbf",
];

/// Deepest allowed nesting of groups and command arguments.
const MAX_DEPTH: usize = 64;

fn blackboard(ch: char) -> char {
    match ch {
        'R' => 'ℝ',
        'N' => 'ℕ',
        'Z' => 'ℤ',
        'Q' => 'ℚ',
        'C' => 'ℂ',
        other => other,
    }
}

fn superscript(ch: char) -> Option<char> {
    Some(match ch {
        '0' => '⁰',
        '1' => '¹',
        '2' => '²',
        '3' => '³',
        '4' => '⁴',
        '5' => '⁵',
        '6' => '⁶',
        '7' => '⁷',
        '8' => '⁸',
        '9' => '⁹',
        '+' => '⁺',
        '-' => '⁻',
        '=' => '⁼',
        '(' => '⁽',
        ')' => '⁾',
        'n' => 'ⁿ',
        'i' => 'ⁱ',
        _ => return None,
    })
}

fn subscript(ch: char) -> Option<char> {
    Some(match ch {
        '0' => '₀',
        '1' => '₁',
        '2' => '₂',
        '3' => '₃',
        '4' => '₄',
        '5' => '₅',
        '6' => '₆',
        '7' => '₇',
        '8' => '₈',
        '9' => '₉',
        '+' => '₊',
        '-' => '₋',
        '=' => '₌',
        '(' => '₍',
        ')' => '₎',
        'a' => 'ₐ',
        'e' => 'ₑ',
        'o' => 'ₒ',
        'x' => 'ₓ',
        'i' => 'ᵢ',
        'j' => 'ⱼ',
        'k' => 'ₖ',
        'm' => 'ₘ',
        'n' => 'ₙ',
        't' => 'ₜ',
        _ => return None,
    })
}

impl MathFormatter for UnicodeMath {
    fn format(&self, text: &str) -> Result<String, MathError> {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        let mut offset = 0;

        while !rest.is_empty() {
            if let Some(after) = rest.strip_prefix("\\$") {
                out.push('$');
                rest = after;
                offset += 2;
                continue;
            }

            let opening = DELIMITERS
                .iter()
                .find(|(open, _)| rest.starts_with(open))
                .filter(|(open, _)| *open != "$" || opens_inline_math(&rest[1..]));

            let Some(&(open, close)) = opening else {
                let mut chars = rest.chars();
                if let Some(ch) = chars.next() {
                    out.push(ch);
                    offset += ch.len_utf8();
                }
                rest = chars.as_str();
                continue;
            };

            let body = &rest[open.len()..];
            let Some(end) = body.find(close) else {
                return Err(MathError::UnterminatedDelimiter {
                    delimiter: open,
                    offset,
                });
            };

            out.push_str(&render_tex(&body[..end])?);
            let consumed = open.len() + end + close.len();
            rest = &rest[consumed..];
            offset += consumed;
        }

        Ok(out)
    }
}

/// A lone `$` before a digit or whitespace is a currency sign.
fn opens_inline_math(body: &str) -> bool {
    match body.chars().next() {
        Some(ch) => !ch.is_whitespace() && !ch.is_ascii_digit(),
        None => false,
    }
}

/// Renders the inside of one math segment.
fn render_tex(tex: &str) -> Result<String, MathError> {
    let mut parser = Parser {
        source: tex,
        chars: tex.chars().collect(),
        pos: 0,
        depth: 0,
    };
    parser.render_until(false)
}

struct Parser<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
    depth: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        Some(ch)
    }

    fn unbalanced(&self) -> MathError {
        MathError::UnbalancedBraces(self.source.to_string())
    }

    fn nested(
        &mut self,
        render: fn(&mut Self) -> Result<String, MathError>,
    ) -> Result<String, MathError> {
        if self.depth == MAX_DEPTH {
            return Err(MathError::TooDeep(MAX_DEPTH));
        }
        self.depth += 1;
        let out = render(self);
        self.depth -= 1;
        out
    }

    fn group(&mut self) -> Result<String, MathError> {
        self.nested(|parser| parser.render_until(true))
    }

    fn render_until(&mut self, in_group: bool) -> Result<String, MathError> {
        let mut out = String::new();

        loop {
            let Some(ch) = self.bump() else {
                return if in_group {
                    Err(self.unbalanced())
                } else {
                    Ok(out)
                };
            };

            match ch {
                '}' if in_group => return Ok(out),
                '}' => return Err(self.unbalanced()),
                '{' => out.push_str(&self.group()?),
                '\\' => out.push_str(&self.nested(Self::command)?),
                '^' => {
                    let arg = self.argument("^")?;
                    out.push_str(&script(&arg, '^', superscript));
                }
                '_' => {
                    let arg = self.argument("_")?;
                    out.push_str(&script(&arg, '_', subscript));
                }
                other => out.push(other),
            }
        }
    }

    fn command(&mut self) -> Result<String, MathError> {
        let start = self.pos;
        while self.peek().is_some_and(|ch| ch.is_ascii_alphabetic()) {
            self.pos += 1;
        }

        if self.pos == start {
            return Ok(match self.bump() {
                Some(',' | ';' | ':' | '!' | ' ') => " ".to_string(),
                Some('\\') => "\n".to_string(),
                Some(other) => other.to_string(),
                None => "\\".to_string(),
            });
        }

        let name: String = self.chars[start..self.pos].iter().collect();
        match name.as_str() {
            "frac" | "dfrac" | "tfrac" => {
                let numerator = self.argument(&name)?;
                let denominator = self.argument(&name)?;
                Ok(format!("{}/{}", wrap(&numerator), wrap(&denominator)))
            }
            "sqrt" => {
                let radicand = self.argument(&name)?;
                Ok(format!("√{}", wrap(&radicand)))
            }
            "mathbb" => {
                let arg = self.argument(&name)?;
                Ok(arg.chars().map(blackboard).collect())
            }
            "left" | "right" => Ok(String::new()),
            name if TEXT_COMMANDS.contains(&name) => self.argument(name),
            name => Ok(SYMBOLS
                .iter()
                .find(|(command, _)| *command == name)
                .map_or_else(|| format!("\\{name}"), |(_, symbol)| symbol.to_string())),
        }
    }

    fn argument(&mut self, command: &str) -> Result<String, MathError> {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }

        match self.bump() {
            Some('{') => self.group(),
            Some('\\') => self.nested(Self::command),
            Some('}') | None => Err(MathError::MissingArgument(
                command.trim_start_matches('\\').to_string(),
            )),
            Some(ch) => Ok(ch.to_string()),
        }
    }
}

fn wrap(arg: &str) -> String {
    if arg.chars().count() <= 1 {
        arg.to_string()
    } else {
        format!("({arg})")
    }
}

fn script(arg: &str, marker: char, map: fn(char) -> Option<char>) -> String {
    let mapped: Option<String> = arg.chars().map(map).collect();
    match mapped {
        Some(mapped) if !mapped.is_empty() => mapped,
        _ => format!("{marker}{}", wrap(arg)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format(text: &str) -> Result<String, MathError> {
        UnicodeMath.format(text)
    }

    #[test]
    fn test_text_without_math_is_unchanged() {
        assert_eq!(
            format("What is the capital of Poland?").unwrap(),
            "What is the capital of Poland?"
        );
        assert_eq!(format("dziękuję").unwrap(), "dziękuję");
    }

    #[test]
    fn test_greek_and_operators() {
        assert_eq!(format("Area is $\\pi r^2$").unwrap(), "Area is π r²");
        assert_eq!(format("\\(a \\leq b \\times c\\)").unwrap(), "a ≤ b × c");
    }

    #[test]
    fn test_display_math() {
        assert_eq!(format("$$\\sum_{i=0}^{n} x_i$$").unwrap(), "∑ᵢ₌₀ⁿ xᵢ");
        assert_eq!(format("\\[e^{i\\pi} = -1\\]").unwrap(), "e^(iπ) = -1");
    }

    #[test]
    fn test_frac_and_sqrt() {
        assert_eq!(format("$\\frac{1}{2}$").unwrap(), "1/2");
        assert_eq!(format("$\\frac{a+b}{c}$").unwrap(), "(a+b)/c");
        assert_eq!(format("$\\sqrt{x+1}$").unwrap(), "√(x+1)");
        assert_eq!(format("$\\sqrt 2$").unwrap(), "√2");
    }

    #[test]
    fn test_blackboard_and_text() {
        assert_eq!(format("$x \\in \\mathbb{R}$").unwrap(), "x ∈ ℝ");
        assert_eq!(format("$\\text{speed} = 5$").unwrap(), "speed = 5");
    }

    #[test]
    fn test_unknown_command_kept() {
        assert_eq!(format("$\\hbar$").unwrap(), "\\hbar");
    }

    #[test]
    fn test_escaped_dollar() {
        assert_eq!(format("costs \\$5").unwrap(), "costs $5");
    }

    #[test]
    fn test_currency_amounts_are_not_math() {
        let text = "Lunch was $5 and dinner $10";
        assert_eq!(format(text).unwrap(), text);
        assert_eq!(format("It costs $ 3, or $").unwrap(), "It costs $ 3, or $");
        assert_eq!(format("$5 buys $x^2$").unwrap(), "$5 buys x²");
    }

    #[test]
    fn test_unterminated_delimiter() {
        assert_eq!(
            format("area $x"),
            Err(MathError::UnterminatedDelimiter {
                delimiter: "$",
                offset: 5,
            })
        );
        assert!(matches!(
            format("\\(x"),
            Err(MathError::UnterminatedDelimiter {
                delimiter: "\\(",
                ..
            })
        ));
    }

    #[test]
    fn test_unbalanced_braces() {
        assert!(matches!(
            format("$x^{2$"),
            Err(MathError::UnbalancedBraces(_))
        ));
        assert!(matches!(
            format("$x}$"),
            Err(MathError::UnbalancedBraces(_))
        ));
    }

    #[test]
    fn test_missing_argument() {
        assert_eq!(
            format("$\\frac{1}$"),
            Err(MathError::MissingArgument("frac".to_string()))
        );
    }

    #[test]
    fn test_deep_nesting_is_rejected() {
        let braces = format!("${}x{}$", "{".repeat(200_000), "}".repeat(200_000));
        assert_eq!(format(&braces), Err(MathError::TooDeep(MAX_DEPTH)));

        let roots = format!("${}2$", "\\sqrt".repeat(200_000));
        assert_eq!(format(&roots), Err(MathError::TooDeep(MAX_DEPTH)));
    }

    #[test]
    fn test_nesting_within_limit() {
        let text = format!("${}x{}$", "{".repeat(MAX_DEPTH), "}".repeat(MAX_DEPTH));
        assert_eq!(format(&text).unwrap(), "x");
    }
}
