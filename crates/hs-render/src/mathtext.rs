//! A small subset of matplotlib-style mathtext.
//!
//! Axis labels such as `p$_T$ [GeV]` or `$\eta$` are split into text runs:
//! `$...$` segments switch to math mode where `\name` macros become Unicode
//! symbols, `_x` / `_{..}` become subscripts and `^x` / `^{..}` superscripts.
//! Latin letters in math mode are set in italics. An unpaired `$` is kept as a
//! literal character.

/// Vertical placement of a run relative to the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shift {
    Normal,
    Sub,
    Super,
}

/// A stretch of text sharing one placement and slant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRun {
    pub text: String,
    pub shift: Shift,
    pub italic: bool,
}

impl TextRun {
    pub fn plain(text: impl Into<String>) -> Self {
        Self { text: text.into(), shift: Shift::Normal, italic: false }
    }
}

/// Split `label` into styled runs.
pub fn parse(label: &str) -> Vec<TextRun> {
    let mut runs = RunBuilder::default();
    let segments = split_dollars(label);
    let n = segments.len();
    for (i, seg) in segments.into_iter().enumerate() {
        let is_math = i % 2 == 1;
        if is_math && i + 1 == n && n % 2 == 0 {
            // Opening `$` without a partner.
            runs.push('$', Shift::Normal, false);
            runs.push_str(&seg, Shift::Normal, false);
        } else if is_math {
            parse_math(&seg, &mut runs);
        } else {
            runs.push_str(&seg, Shift::Normal, false);
        }
    }
    runs.finish()
}

/// Concatenated text of all runs, e.g. `pT [GeV]` for `p$_T$ [GeV]`.
pub fn plain_text(runs: &[TextRun]) -> String {
    runs.iter().map(|r| r.text.as_str()).collect()
}

/// Split on unescaped `$`; `\$` stays a literal dollar sign.
fn split_dollars(label: &str) -> Vec<String> {
    let mut out = vec![String::new()];
    let mut chars = label.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'$') => {
                chars.next();
                push_last(&mut out, '$');
            }
            '$' => out.push(String::new()),
            _ => push_last(&mut out, c),
        }
    }
    out
}

fn push_last(out: &mut [String], c: char) {
    if let Some(last) = out.last_mut() {
        last.push(c);
    }
}

fn parse_math(src: &str, runs: &mut RunBuilder) {
    let chars: Vec<char> = src.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '_' | '^' => {
                let shift = if chars[i] == '_' { Shift::Sub } else { Shift::Super };
                let (group, next) = take_group(&chars, i + 1);
                emit_math(&group, shift, runs);
                i = next;
            }
            '{' | '}' => i += 1,
            '\\' => {
                let (sym, next) = take_macro(&chars, i);
                runs.push_str(&sym, Shift::Normal, false);
                i = next;
            }
            c => {
                runs.push(c, Shift::Normal, c.is_ascii_alphabetic());
                i += 1;
            }
        }
    }
}

/// Math content inside a sub/superscript group (macros allowed, no nesting).
fn emit_math(group: &[char], shift: Shift, runs: &mut RunBuilder) {
    let mut i = 0;
    while i < group.len() {
        if group[i] == '\\' {
            let (sym, next) = take_macro(group, i);
            runs.push_str(&sym, shift, false);
            i = next;
        } else {
            if group[i] != '{' && group[i] != '}' {
                runs.push(group[i], shift, group[i].is_ascii_alphabetic());
            }
            i += 1;
        }
    }
}

/// Read a `{...}` group or a single token (character or macro) starting at `start`.
fn take_group(chars: &[char], start: usize) -> (Vec<char>, usize) {
    match chars.get(start) {
        None => (Vec::new(), start),
        Some('{') => {
            let mut depth = 0usize;
            for (j, &c) in chars.iter().enumerate().skip(start) {
                match c {
                    '{' => depth += 1,
                    '}' => {
                        depth -= 1;
                        if depth == 0 {
                            return (chars[start + 1..j].to_vec(), j + 1);
                        }
                    }
                    _ => {}
                }
            }
            (chars[start + 1..].to_vec(), chars.len())
        }
        Some('\\') => {
            let end = macro_end(chars, start);
            (chars[start..end].to_vec(), end)
        }
        Some(&c) => (vec![c], start + 1),
    }
}

fn macro_end(chars: &[char], start: usize) -> usize {
    let mut end = start + 1;
    while end < chars.len() && chars[end].is_ascii_alphabetic() {
        end += 1;
    }
    if end == start + 1 && end < chars.len() {
        // Single-symbol macro such as `\,` or `\%`.
        end += 1;
    }
    end
}

fn take_macro(chars: &[char], start: usize) -> (String, usize) {
    let end = macro_end(chars, start);
    let name: String = chars[start + 1..end].iter().collect();
    let sym = symbol(&name).map(str::to_string).unwrap_or(name);
    (sym, end)
}

fn symbol(name: &str) -> Option<&'static str> {
    Some(match name {
        "alpha" => "α",
        "beta" => "β",
        "gamma" => "γ",
        "delta" => "δ",
        "epsilon" => "ε",
        "eta" => "η",
        "theta" => "θ",
        "lambda" => "λ",
        "mu" => "μ",
        "nu" => "ν",
        "pi" => "π",
        "rho" => "ρ",
        "sigma" => "σ",
        "tau" => "τ",
        "phi" => "φ",
        "chi" => "χ",
        "psi" => "ψ",
        "omega" => "ω",
        "ell" => "ℓ",
        "Gamma" => "Γ",
        "Delta" => "Δ",
        "Theta" => "Θ",
        "Lambda" => "Λ",
        "Sigma" => "Σ",
        "Phi" => "Φ",
        "Omega" => "Ω",
        "pm" => "±",
        "times" => "×",
        "to" | "rightarrow" => "→",
        "sqrt" => "√",
        "infty" => "∞",
        "," | ";" | " " => " ",
        "%" => "%",
        "_" => "_",
        "{" => "{",
        "}" => "}",
        _ => return None,
    })
}

#[derive(Default)]
struct RunBuilder {
    runs: Vec<TextRun>,
}

impl RunBuilder {
    fn push(&mut self, c: char, shift: Shift, italic: bool) {
        match self.runs.last_mut() {
            Some(last) if last.shift == shift && last.italic == italic => last.text.push(c),
            _ => self.runs.push(TextRun { text: c.to_string(), shift, italic }),
        }
    }

    fn push_str(&mut self, s: &str, shift: Shift, italic: bool) {
        for c in s.chars() {
            self.push(c, shift, italic);
        }
    }

    fn finish(self) -> Vec<TextRun> {
        self.runs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str, shift: Shift, italic: bool) -> TextRun {
        TextRun { text: text.into(), shift, italic }
    }

    #[test]
    fn plain_label_is_one_run() {
        assert_eq!(parse("Mass [GeV]"), vec![TextRun::plain("Mass [GeV]")]);
    }

    #[test]
    fn greek_macro() {
        assert_eq!(parse(r"$\eta$"), vec![TextRun::plain("η")]);
        assert_eq!(parse(r"$\phi$"), vec![TextRun::plain("φ")]);
    }

    #[test]
    fn subscript_run() {
        assert_eq!(parse("p$_T$ [GeV]"), vec![
            TextRun::plain("p"),
            run("T", Shift::Sub, true),
            TextRun::plain(" [GeV]"),
        ]);
        assert_eq!(plain_text(&parse("p$_T$ [GeV]")), "pT [GeV]");
    }

    #[test]
    fn braced_groups_and_superscripts() {
        assert_eq!(parse("$m_{jj}^2$"), vec![
            run("m", Shift::Normal, true),
            run("jj", Shift::Sub, true),
            run("2", Shift::Super, false),
        ]);
    }

    #[test]
    fn unpaired_dollar_is_literal() {
        assert_eq!(plain_text(&parse("cost $5")), "cost $5");
        assert_eq!(plain_text(&parse(r"\$10")), "$10");
    }

    #[test]
    fn unknown_macro_keeps_name() {
        assert_eq!(plain_text(&parse(r"$\foo$")), "foo");
    }
}
