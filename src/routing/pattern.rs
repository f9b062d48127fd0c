//! Path template compilation.
//!
//! Templates compile to an anchored regular expression for matching and keep
//! their token list for expansion, so one [`Pattern`] works in both
//! directions.
//!
//! Sinatra-style syntax:
//!
//! | Template        | Meaning                                        |
//! |-----------------|------------------------------------------------|
//! | `/users/:id`    | `id` captures one segment (no `/`, `?`, `#`)   |
//! | `/:id.:ext`     | captures are lazy, so the dot splits them      |
//! | `/files/*path`  | `path` captures the rest, slashes included     |
//! | `/files/*`      | same, captured as `splat`                      |
//! | `/users/{id}`   | brace form of a capture                        |
//! | `/dragons/?`    | `?` makes the preceding char or capture optional |
//! | `/a\:b`         | backslash escapes the next character           |
//!
//! The template style only understands `{name}`.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ExpandError, PatternError};
use crate::routing::matcher::PathMatcher;
use crate::routing::params::Params;

/// Characters escaped when a splat value is written into a path.
const PATH: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// A named capture fills exactly one segment, so `/` is escaped too.
const SEGMENT: &AsciiSet = &PATH.add(b'/');

/// Name given to an anonymous `*` capture.
pub const SPLAT: &str = "splat";

/// Template dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    #[default]
    Sinatra,
    Template,
}

/// Character classes usable as capture constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CharClass {
    Digit,
    Alpha,
    Alnum,
    Word,
}

impl CharClass {
    fn regex(self) -> &'static str {
        match self {
            CharClass::Digit => "[0-9]+",
            CharClass::Alpha => "[A-Za-z]+",
            CharClass::Alnum => "[A-Za-z0-9]+",
            CharClass::Word => r"\w+",
        }
    }
}

/// What a single capture is allowed to match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureRule {
    Regex(String),
    Class(CharClass),
    OneOf(Vec<String>),
}

impl CaptureRule {
    /// Parse the textual form used by configuration files: a class name
    /// (`digit`), a `|`-separated list (`json|html`), or a regex.
    pub fn parse(s: &str) -> Self {
        match s {
            "digit" => CaptureRule::Class(CharClass::Digit),
            "alpha" => CaptureRule::Class(CharClass::Alpha),
            "alnum" => CaptureRule::Class(CharClass::Alnum),
            "word" => CaptureRule::Class(CharClass::Word),
            _ if s.contains('|') && s.chars().all(|c| c.is_alphanumeric() || "|-_.".contains(c)) => {
                CaptureRule::OneOf(s.split('|').map(str::to_string).collect())
            }
            _ => CaptureRule::Regex(s.to_string()),
        }
    }

    fn regex(&self) -> String {
        match self {
            CaptureRule::Regex(r) => format!("(?:{r})"),
            CaptureRule::Class(c) => c.regex().to_string(),
            CaptureRule::OneOf(options) => {
                let escaped: Vec<String> = options.iter().map(|o| regex::escape(o)).collect();
                format!("(?:{})", escaped.join("|"))
            }
        }
    }
}

/// Constraints on captured values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capture {
    /// Applies to every capture in the template.
    All(CaptureRule),
    /// Applies per capture name; unnamed captures keep the default.
    Named(BTreeMap<String, CaptureRule>),
}

impl Capture {
    fn rule_for(&self, name: &str) -> Option<&CaptureRule> {
        match self {
            Capture::All(rule) => Some(rule),
            Capture::Named(rules) => rules.get(name),
        }
    }
}

/// Policy for parameters that the template does not consume on expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdditionalValues {
    #[default]
    Ignore,
    /// Render them as a query string.
    Append,
}

/// Options for [`Pattern::compile`].
#[derive(Debug, Clone, Default)]
pub struct PatternOptions {
    pub style: Style,
    pub capture: Option<Capture>,
    /// Paths matching this template are rejected.
    pub except: Option<String>,
    pub additional_values: AdditionalValues,
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Literal(String),
    Capture { name: String, splat: bool },
}

#[derive(Debug, Clone)]
struct Segment {
    token: Token,
    optional: bool,
}

/// A compiled, bidirectional path template.
pub struct Pattern {
    source: String,
    segments: Vec<Segment>,
    regex: Regex,
    /// `(regex group name, capture name)` in template order.
    groups: Vec<(String, String)>,
    except: Option<Box<Pattern>>,
    additional_values: AdditionalValues,
}

impl Pattern {
    /// Compile a template with default options.
    pub fn new(template: &str) -> Result<Self, PatternError> {
        Self::compile(template, &PatternOptions::default())
    }

    pub fn compile(template: &str, options: &PatternOptions) -> Result<Self, PatternError> {
        let segments = match options.style {
            Style::Sinatra => tokenize_sinatra(template)?,
            Style::Template => tokenize_template(template)?,
        };

        let mut seen = HashSet::new();
        let mut groups = Vec::new();
        let mut expr = String::from("^");

        for segment in &segments {
            let part = match &segment.token {
                Token::Literal(text) => regex::escape(text),
                Token::Capture { name, splat } => {
                    if !seen.insert(name.clone()) {
                        return Err(PatternError::DuplicateCapture {
                            pattern: template.to_string(),
                            name: name.clone(),
                        });
                    }
                    let group = format!("c{}", groups.len());
                    let body = match options.capture.as_ref().and_then(|c| c.rule_for(name)) {
                        Some(rule) => rule.regex(),
                        None if *splat => ".*?".to_string(),
                        None => "[^/?#]+?".to_string(),
                    };
                    let part = format!("(?P<{group}>{body})");
                    groups.push((group, name.clone()));
                    part
                }
            };
            if segment.optional {
                expr.push_str(&format!("(?:{part})?"));
            } else {
                expr.push_str(&part);
            }
        }
        expr.push('$');

        let regex = Regex::new(&expr).map_err(|source| PatternError::Regex {
            pattern: template.to_string(),
            source,
        })?;

        let except = match &options.except {
            Some(except) => {
                let except_options = PatternOptions {
                    style: options.style,
                    ..PatternOptions::default()
                };
                Some(Box::new(Pattern::compile(except, &except_options)?))
            }
            None => None,
        };

        Ok(Self {
            source: template.to_string(),
            segments,
            regex,
            groups,
            except,
            additional_values: options.additional_values,
        })
    }

    /// Capture names in template order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|(_, name)| name.as_str())
    }
}

impl PathMatcher for Pattern {
    fn match_path(&self, path: &str) -> Option<Vec<(String, String)>> {
        let caps = self.regex.captures(path)?;

        if let Some(except) = &self.except {
            if except.regex.is_match(path) {
                return None;
            }
        }

        Some(
            self.groups
                .iter()
                .filter_map(|(group, name)| {
                    caps.name(group).map(|m| {
                        let value = percent_decode_str(m.as_str()).decode_utf8_lossy();
                        (name.clone(), value.into_owned())
                    })
                })
                .collect(),
        )
    }

    fn expand(&self, params: &Params) -> Result<String, ExpandError> {
        let mut out = String::new();
        let mut used = HashSet::new();

        for segment in &self.segments {
            match &segment.token {
                Token::Literal(text) => {
                    if !segment.optional {
                        out.push_str(text);
                    }
                }
                Token::Capture { name, splat } => match params.get(name) {
                    Some(value) => {
                        used.insert(name.as_str());
                        let set = if *splat { PATH } else { SEGMENT };
                        out.extend(utf8_percent_encode(&value.to_string(), set));
                    }
                    None if segment.optional => {}
                    None => {
                        return Err(ExpandError::MissingParam {
                            pattern: self.source.clone(),
                            name: name.clone(),
                        })
                    }
                },
            }
        }

        if self.additional_values == AdditionalValues::Append {
            let mut query = url::form_urlencoded::Serializer::new(String::new());
            let mut any = false;
            for (key, value) in params.iter().filter(|(k, _)| !used.contains(k.as_str())) {
                query.append_pair(key, &value.to_string());
                any = true;
            }
            if any {
                out.push('?');
                out.push_str(&query.finish());
            }
        }

        Ok(out)
    }

    fn source(&self) -> &str {
        &self.source
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pattern")
            .field("source", &self.source)
            .field("regex", &self.regex.as_str())
            .finish()
    }
}

fn push_literal(segments: &mut Vec<Segment>, c: char) {
    if let Some(Segment {
        token: Token::Literal(text),
        optional: false,
    }) = segments.last_mut()
    {
        text.push(c);
        return;
    }
    segments.push(Segment {
        token: Token::Literal(c.to_string()),
        optional: false,
    });
}

fn push_capture(segments: &mut Vec<Segment>, name: String, splat: bool) {
    segments.push(Segment {
        token: Token::Capture { name, splat },
        optional: false,
    });
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn read_braced(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    template: &str,
) -> Result<String, PatternError> {
    let mut name = String::new();
    loop {
        match chars.next() {
            Some('}') => break,
            Some(c) => name.push(c),
            None => return Err(PatternError::Unterminated(template.to_string())),
        }
    }
    let name = name.trim().to_string();
    if name.is_empty() || !name.chars().all(is_name_char) {
        return Err(PatternError::EmptyCapture(template.to_string()));
    }
    Ok(name)
}

fn tokenize_sinatra(template: &str) -> Result<Vec<Segment>, PatternError> {
    let mut segments: Vec<Segment> = Vec::new();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            ':' => {
                let mut name = String::new();
                while let Some(&n) = chars.peek() {
                    if !is_name_char(n) {
                        break;
                    }
                    name.push(n);
                    chars.next();
                }
                if name.is_empty() {
                    return Err(PatternError::EmptyCapture(template.to_string()));
                }
                push_capture(&mut segments, name, false);
            }
            '*' => {
                let mut name = String::new();
                while let Some(&n) = chars.peek() {
                    if !is_name_char(n) {
                        break;
                    }
                    name.push(n);
                    chars.next();
                }
                if name.is_empty() {
                    name = SPLAT.to_string();
                }
                push_capture(&mut segments, name, true);
            }
            '{' => {
                let name = read_braced(&mut chars, template)?;
                push_capture(&mut segments, name, false);
            }
            '?' => match segments.last_mut() {
                Some(Segment {
                    token: Token::Literal(text),
                    optional: false,
                }) if text.chars().count() > 1 => {
                    // only the last character becomes optional
                    let last = text.pop().map(String::from).unwrap_or_default();
                    segments.push(Segment {
                        token: Token::Literal(last),
                        optional: true,
                    });
                }
                Some(segment) if !segment.optional => segment.optional = true,
                _ => push_literal(&mut segments, '?'),
            },
            '\\' => {
                if let Some(escaped) = chars.next() {
                    push_literal(&mut segments, escaped);
                }
            }
            _ => push_literal(&mut segments, c),
        }
    }

    Ok(segments)
}

fn tokenize_template(template: &str) -> Result<Vec<Segment>, PatternError> {
    let mut segments: Vec<Segment> = Vec::new();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '{' {
            let name = read_braced(&mut chars, template)?;
            push_capture(&mut segments, name, false);
        } else {
            push_literal(&mut segments, c);
        }
    }

    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn captures(pattern: &Pattern, path: &str) -> Option<Vec<(String, String)>> {
        pattern.match_path(path)
    }

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_named_capture() {
        let p = Pattern::new("/users/:id").unwrap();
        assert_eq!(captures(&p, "/users/42"), Some(pairs(&[("id", "42")])));
        assert_eq!(captures(&p, "/users/42/edit"), None);
        assert_eq!(captures(&p, "/users/"), None);
    }

    #[test]
    fn test_literal_only() {
        let p = Pattern::new("/dragons").unwrap();
        assert_eq!(captures(&p, "/dragons"), Some(vec![]));
        assert_eq!(captures(&p, "/dragonsx"), None);
    }

    #[test]
    fn test_dot_splits_lazy_captures() {
        let p = Pattern::new("/:id.:ext").unwrap();
        assert_eq!(
            captures(&p, "/report.json"),
            Some(pairs(&[("id", "report"), ("ext", "json")]))
        );
    }

    #[test]
    fn test_optional_trailing_slash() {
        let p = Pattern::new("/dragons/?").unwrap();
        assert!(p.match_path("/dragons").is_some());
        assert!(p.match_path("/dragons/").is_some());
        assert_eq!(p.expand(&Params::new()).unwrap(), "/dragons");
    }

    #[test]
    fn test_optional_capture() {
        let p = Pattern::new("/pages/:id?").unwrap();
        assert_eq!(captures(&p, "/pages/"), Some(vec![]));
        assert_eq!(captures(&p, "/pages/3"), Some(pairs(&[("id", "3")])));
    }

    #[test]
    fn test_splats() {
        let p = Pattern::new("/files/*").unwrap();
        assert_eq!(
            captures(&p, "/files/a/b/c.txt"),
            Some(pairs(&[(SPLAT, "a/b/c.txt")]))
        );

        let p = Pattern::new("/pages/*slug/edit").unwrap();
        assert_eq!(
            captures(&p, "/pages/system/home/edit"),
            Some(pairs(&[("slug", "system/home")]))
        );
    }

    #[test]
    fn test_brace_capture_and_escape() {
        let p = Pattern::new("/unicorns/{id}").unwrap();
        assert_eq!(captures(&p, "/unicorns/9"), Some(pairs(&[("id", "9")])));

        let p = Pattern::new(r"/a\:b").unwrap();
        assert!(p.match_path("/a:b").is_some());
    }

    #[test]
    fn test_template_style_keeps_colons_literal() {
        let options = PatternOptions {
            style: Style::Template,
            ..PatternOptions::default()
        };
        let p = Pattern::compile("/time/12:{minute}", &options).unwrap();
        assert_eq!(captures(&p, "/time/12:30"), Some(pairs(&[("minute", "30")])));
    }

    #[test]
    fn test_capture_constraints() {
        let options = PatternOptions {
            capture: Some(Capture::All(CaptureRule::Class(CharClass::Digit))),
            ..PatternOptions::default()
        };
        let p = Pattern::compile("/users/:id", &options).unwrap();
        assert!(p.match_path("/users/42").is_some());
        assert!(p.match_path("/users/abc").is_none());

        let mut rules = BTreeMap::new();
        rules.insert("id".to_string(), CaptureRule::Regex(r"\d+".into()));
        rules.insert(
            "ext".to_string(),
            CaptureRule::OneOf(vec!["json".into(), "html".into()]),
        );
        let options = PatternOptions {
            capture: Some(Capture::Named(rules)),
            ..PatternOptions::default()
        };
        let p = Pattern::compile("/users/:id.:ext", &options).unwrap();
        assert!(p.match_path("/users/1.json").is_some());
        assert!(p.match_path("/users/1.xml").is_none());
    }

    #[test]
    fn test_capture_rule_parse() {
        assert_eq!(CaptureRule::parse("digit"), CaptureRule::Class(CharClass::Digit));
        assert_eq!(
            CaptureRule::parse("json|html"),
            CaptureRule::OneOf(vec!["json".into(), "html".into()])
        );
        assert_eq!(CaptureRule::parse(r"\d+"), CaptureRule::Regex(r"\d+".into()));
    }

    #[test]
    fn test_except() {
        let options = PatternOptions {
            except: Some("/pages/system/*/edit".into()),
            ..PatternOptions::default()
        };
        let p = Pattern::compile("/pages/*slug/edit", &options).unwrap();
        assert!(p.match_path("/pages/about/edit").is_some());
        assert!(p.match_path("/pages/system/home/edit").is_none());
    }

    #[test]
    fn test_compile_errors() {
        assert!(matches!(
            Pattern::new("/:id/:id"),
            Err(PatternError::DuplicateCapture { .. })
        ));
        assert!(matches!(Pattern::new("/{id"), Err(PatternError::Unterminated(_))));
        assert!(matches!(Pattern::new("/:/x"), Err(PatternError::EmptyCapture(_))));

        let options = PatternOptions {
            capture: Some(Capture::All(CaptureRule::Regex("(".into()))),
            ..PatternOptions::default()
        };
        assert!(matches!(
            Pattern::compile("/:id", &options),
            Err(PatternError::Regex { .. })
        ));
    }

    #[test]
    fn test_expand() {
        let p = Pattern::new("/users/:id").unwrap();
        let params = Params::new().with("id", 42i64).with("type", "kiwi");
        assert_eq!(p.expand(&params).unwrap(), "/users/42");

        let err = p.expand(&Params::new()).unwrap_err();
        assert_eq!(
            err,
            ExpandError::MissingParam {
                pattern: "/users/:id".into(),
                name: "id".into()
            }
        );
    }

    #[test]
    fn test_expand_encodes_segment_values() {
        let p = Pattern::new("/users/:id").unwrap();
        let path = p.expand(&Params::new().with("id", "a/b")).unwrap();
        assert_eq!(path, "/users/a%2Fb");
        assert_eq!(captures(&p, &path), Some(pairs(&[("id", "a/b")])));

        let p = Pattern::new("/dragons/{id}").unwrap();
        let path = p.expand(&Params::new().with("id", "smaug é")).unwrap();
        assert_eq!(path, "/dragons/smaug%20%C3%A9");
        assert_eq!(captures(&p, &path), Some(pairs(&[("id", "smaug é")])));
    }

    #[test]
    fn test_expand_splat_keeps_slashes() {
        let p = Pattern::new("/files/*path").unwrap();
        let params = Params::new().with("path", "docs/read me.txt");
        let path = p.expand(&params).unwrap();
        assert_eq!(path, "/files/docs/read%20me.txt");
        assert_eq!(captures(&p, &path), Some(pairs(&[("path", "docs/read me.txt")])));
    }

    #[test]
    fn test_captures_are_decoded() {
        let p = Pattern::new("/users/:id").unwrap();
        assert_eq!(
            captures(&p, "/users/john%20doe"),
            Some(pairs(&[("id", "john doe")]))
        );
    }

    #[test]
    fn test_expand_appends_additional_values() {
        let options = PatternOptions {
            additional_values: AdditionalValues::Append,
            ..PatternOptions::default()
        };
        let p = Pattern::compile("/dragons/:id", &options).unwrap();
        let params = Params::new().with("id", "7").with("type", "angora");
        assert_eq!(p.expand(&params).unwrap(), "/dragons/7?type=angora");

        let params = Params::new().with("id", "7");
        assert_eq!(p.expand(&params).unwrap(), "/dragons/7");
    }

    #[test]
    fn test_names_in_template_order() {
        let p = Pattern::new("/:controller/:action/:id").unwrap();
        assert_eq!(p.names().collect::<Vec<_>>(), vec!["controller", "action", "id"]);
    }
}
