//! Minimal GLSL ES 1.0 source checks for the headless host.
//!
//! This is not a compiler. It rejects sources a real driver would reject
//! for the most common reasons (stray text, unbalanced delimiters, missing
//! `main`, missing stage output) and extracts the global interface so links
//! can compare varyings and uniforms.

use crate::gl::ShaderStage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Qualifier {
    Attribute,
    Varying,
    Uniform,
}

impl Qualifier {
    fn parse(word: &str) -> Option<Self> {
        match word {
            "attribute" => Some(Qualifier::Attribute),
            "varying" => Some(Qualifier::Varying),
            "uniform" => Some(Qualifier::Uniform),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Declaration {
    pub qualifier: Qualifier,
    pub ty: String,
    pub name: String,
}

/// Global interface of a successfully checked shader
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Interface {
    pub declarations: Vec<Declaration>,
}

impl Interface {
    pub fn find(&self, qualifier: Qualifier, name: &str) -> Option<&Declaration> {
        self.declarations
            .iter()
            .find(|d| d.qualifier == qualifier && d.name == name)
    }

    pub fn with_qualifier(&self, qualifier: Qualifier) -> impl Iterator<Item = &Declaration> {
        self.declarations
            .iter()
            .filter(move |d| d.qualifier == qualifier)
    }
}

const PRECISIONS: [&str; 3] = ["lowp", "mediump", "highp"];

/// Check `source` for `stage`, returning its interface or a driver-style log.
pub(crate) fn check(stage: ShaderStage, source: &str) -> Result<Interface, String> {
    let text = strip_comments_and_directives(source);
    check_delimiters(&text)?;

    let mut interface = Interface::default();
    let mut has_main = false;
    let mut statement = String::new();
    let mut statement_start = 0;
    let mut depth = 0usize;

    for (offset, ch) in text.char_indices() {
        if depth > 0 {
            match ch {
                '{' => depth += 1,
                '}' => depth -= 1,
                _ => {}
            }
            continue;
        }
        match ch {
            '{' => {
                if is_main_header(&statement) {
                    has_main = true;
                }
                statement.clear();
                depth = 1;
            }
            ';' => {
                parse_statement(stage, &statement, line_of(&text, statement_start), &mut interface)?;
                statement.clear();
            }
            _ => {
                if statement.trim().is_empty() && !ch.is_whitespace() {
                    statement.clear();
                    statement_start = offset;
                }
                statement.push(ch);
            }
        }
    }

    if let Some(token) = statement.split_whitespace().next() {
        return Err(error_line(line_of(&text, statement_start), token, "syntax error"));
    }

    if !has_main {
        return Err(error_line(line_of(&text, text.len()), "", "Missing main()"));
    }

    let outputs: &[&str] = match stage {
        ShaderStage::Vertex => &["gl_Position"],
        ShaderStage::Fragment => &["gl_FragColor", "gl_FragData"],
    };
    if !outputs.iter().any(|output| assigns(&text, output)) {
        return Err(error_line(
            line_of(&text, text.len()),
            outputs[0],
            &format!("{} shader does not write {}", stage, outputs.join(" or ")),
        ));
    }

    Ok(interface)
}

fn error_line(line: usize, token: &str, message: &str) -> String {
    format!("ERROR: 0:{}: '{}' : {}\n", line, token, message)
}

fn line_of(text: &str, offset: usize) -> usize {
    text[..offset.min(text.len())].matches('\n').count() + 1
}

/// Blank out comments and preprocessor lines, keeping every newline so
/// diagnostics report the original line numbers.
fn strip_comments_and_directives(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    let mut at_line_start = true;

    while let Some(ch) = chars.next() {
        match ch {
            '/' if chars.peek() == Some(&'/') => {
                while let Some(&next) = chars.peek() {
                    if next == '\n' {
                        break;
                    }
                    chars.next();
                }
                out.push(' ');
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut previous = '\0';
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                    }
                    if previous == '*' && next == '/' {
                        break;
                    }
                    previous = next;
                }
                out.push(' ');
            }
            '#' if at_line_start => {
                while let Some(&next) = chars.peek() {
                    if next == '\n' {
                        break;
                    }
                    chars.next();
                }
            }
            _ => {
                if ch == '\n' {
                    at_line_start = true;
                } else if !ch.is_whitespace() {
                    at_line_start = false;
                }
                out.push(ch);
            }
        }
    }
    out
}

fn check_delimiters(text: &str) -> Result<(), String> {
    let mut stack: Vec<(char, usize)> = Vec::new();
    for (offset, ch) in text.char_indices() {
        match ch {
            '(' | '{' | '[' => stack.push((ch, offset)),
            ')' | '}' | ']' => {
                let expected = match ch {
                    ')' => '(',
                    '}' => '{',
                    _ => '[',
                };
                match stack.pop() {
                    Some((open, _)) if open == expected => {}
                    _ => {
                        return Err(error_line(
                            line_of(text, offset),
                            &ch.to_string(),
                            "syntax error",
                        ))
                    }
                }
            }
            _ => {}
        }
    }
    if stack.is_empty() {
        Ok(())
    } else {
        Err(error_line(line_of(text, text.len()), "", "syntax error"))
    }
}

fn is_main_header(header: &str) -> bool {
    let compact: String = header.chars().filter(|c| !c.is_whitespace()).collect();
    compact == "voidmain()" || compact == "voidmain(void)"
}

/// Parse one top-level `;`-terminated statement
fn parse_statement(
    stage: ShaderStage,
    statement: &str,
    line: usize,
    interface: &mut Interface,
) -> Result<(), String> {
    let mut words = statement.split_whitespace().peekable();
    let first = match words.peek() {
        Some(word) => *word,
        None => return Ok(()),
    };

    if first == "precision" {
        return Ok(());
    }

    let qualifier = Qualifier::parse(first);
    if qualifier.is_some() || first == "const" {
        words.next();
    }
    if qualifier == Some(Qualifier::Attribute) && stage == ShaderStage::Fragment {
        return Err(error_line(line, "attribute", "supported in vertex shaders only"));
    }

    if words.peek().map_or(false, |w| PRECISIONS.contains(w)) {
        words.next();
    }

    let ty = match words.next() {
        Some(ty) if is_identifier(ty) => ty,
        Some(token) => return Err(error_line(line, token, "syntax error")),
        None => return Err(error_line(line, first, "syntax error")),
    };

    let rest: String = words.collect::<Vec<_>>().join(" ");
    if rest.is_empty() {
        return Err(error_line(line, ty, "syntax error"));
    }

    let Some(qualifier) = qualifier else {
        // Plain globals and constants carry no interface
        return Ok(());
    };

    for declarator in rest.split(',') {
        let declarator = declarator.trim();
        let (name, array) = match declarator.find('[') {
            Some(index) => (declarator[..index].trim(), declarator[index..].replace(' ', "")),
            None => (declarator, String::new()),
        };
        if !is_identifier(name) {
            return Err(error_line(line, name, "syntax error"));
        }
        interface.declarations.push(Declaration {
            qualifier,
            ty: format!("{}{}", ty, array),
            name: name.to_string(),
        });
    }
    Ok(())
}

fn is_identifier(word: &str) -> bool {
    let mut chars = word.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Does `text` contain an assignment to `ident` (optionally swizzled or
/// indexed)?
fn assigns(text: &str, ident: &str) -> bool {
    text.match_indices(ident).any(|(offset, _)| {
        let before = text[..offset].chars().next_back();
        if before.map_or(false, |c| c.is_ascii_alphanumeric() || c == '_') {
            return false;
        }
        let mut rest = text[offset + ident.len()..].chars().peekable();
        if rest
            .peek()
            .map_or(false, |c| c.is_ascii_alphanumeric() || *c == '_')
        {
            return false;
        }
        let mut bracket = 0usize;
        while let Some(&c) = rest.peek() {
            match c {
                '[' => bracket += 1,
                ']' => bracket = bracket.saturating_sub(1),
                _ if bracket > 0 => {}
                '.' => {}
                c if c.is_whitespace() || c.is_ascii_alphabetic() => {}
                _ => break,
            }
            rest.next();
        }
        rest.next() == Some('=') && rest.next() != Some('=')
    })
}
