use rustc_hash::FxHashSet;
use thiserror::Error;

/// A failure binding call-site arguments to an [`ArgumentSpec`].
///
/// The resolver stops at the first failure; the analyzer turns the message
/// into a single Error diagnostic with code [`ArgumentError::code`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgumentError {
    #[error("Keyword '{keyword}' expected {expected} arguments, got {got}.")]
    WrongCount {
        keyword: String,
        expected: String,
        got: usize,
    },
    #[error("Keyword '{keyword}' got multiple values for argument '{argument}'.")]
    MultipleValues { keyword: String, argument: String },
    #[error("Non-existing named argument '{argument}'.")]
    NonExistingNamed { argument: String },
    #[error("Keyword '{keyword}' missing named-only argument '{argument}'.")]
    MissingNamedOnly { keyword: String, argument: String },
}

impl ArgumentError {
    /// The diagnostic code shared by every binding failure.
    pub fn code(&self) -> &'static str {
        "ArgumentError"
    }
}

/// One declared parameter, optionally with a default value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub default: Option<String>,
}

impl Parameter {
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
        }
    }

    pub fn with_default(name: impl Into<String>, default: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: Some(default.into()),
        }
    }
}

/// The declared argument specification of a keyword.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgumentSpec {
    /// Keyword name used in failure messages.
    pub name: Option<String>,
    pub positional_or_named: Vec<Parameter>,
    pub var_positional: Option<String>,
    pub named_only: Vec<Parameter>,
    pub var_named: Option<String>,
}

impl ArgumentSpec {
    /// Parse the libdoc-style argument strings: `arg`, `arg=default`,
    /// `*varargs`, `**kwargs`, with named-only parameters following the
    /// varargs marker.
    pub fn from_strings<'a>(args: impl IntoIterator<Item = &'a str>) -> Self {
        let mut spec = Self::default();
        let mut after_varargs = false;
        for arg in args {
            if let Some(kwargs) = arg.strip_prefix("**") {
                spec.var_named = Some(kwargs.to_string());
            } else if let Some(varargs) = arg.strip_prefix('*') {
                // A bare `*` only separates named-only parameters.
                if !varargs.is_empty() {
                    spec.var_positional = Some(varargs.to_string());
                }
                after_varargs = true;
            } else {
                let parameter = match arg.split_once('=') {
                    Some((name, default)) => Parameter::with_default(name, default),
                    None => Parameter::required(arg),
                };
                if after_varargs {
                    spec.named_only.push(parameter);
                } else {
                    spec.positional_or_named.push(parameter);
                }
            }
        }
        spec
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Validate a call-site argument list against this specification.
    ///
    /// `resolve_named` disables named-argument splitting entirely (the
    /// run-keyword wrappers pass their tail through verbatim), and values at
    /// or past `resolve_variables_until` are opaque positionals that never
    /// split into `name=value`.
    pub fn resolve(
        &self,
        values: &[&str],
        resolve_variables_until: Option<usize>,
        resolve_named: bool,
    ) -> Result<(), ArgumentError> {
        let keyword = self.name.clone().unwrap_or_else(|| "keyword".to_string());
        let split_limit = resolve_variables_until.unwrap_or(values.len());

        let mut positional = 0usize;
        let mut named: Vec<(&str, &str)> = Vec::new();

        for (index, value) in values.iter().enumerate() {
            let splittable = resolve_named && index < split_limit;
            match splittable.then(|| self.split_named(value)).flatten() {
                Some((name, rest)) => {
                    if self.is_known_named(name) || self.var_named.is_some() || !named.is_empty() {
                        named.push((name, rest));
                    } else {
                        positional += 1;
                    }
                }
                None => positional += 1,
            }
        }

        let mut seen: FxHashSet<&str> = FxHashSet::default();
        let mut filled_positional = 0usize;
        for &(name, _) in &named {
            if !self.is_known_named(name) {
                if self.var_named.is_none() {
                    return Err(ArgumentError::NonExistingNamed {
                        argument: name.to_string(),
                    });
                }
                continue;
            }
            if !seen.insert(name) {
                return Err(ArgumentError::MultipleValues {
                    keyword,
                    argument: name.to_string(),
                });
            }
            if let Some(slot) = self
                .positional_or_named
                .iter()
                .position(|parameter| parameter.name == name)
            {
                if slot < positional {
                    return Err(ArgumentError::MultipleValues {
                        keyword,
                        argument: name.to_string(),
                    });
                }
                filled_positional += 1;
            }
        }

        let total = positional + filled_positional;
        let min = self
            .positional_or_named
            .iter()
            .filter(|parameter| parameter.default.is_none())
            .count();
        let max = if self.var_positional.is_some() {
            usize::MAX
        } else {
            self.positional_or_named.len()
        };
        if total < min || total > max {
            return Err(ArgumentError::WrongCount {
                keyword,
                expected: expected_range(min, max),
                got: total,
            });
        }

        for parameter in &self.named_only {
            if parameter.default.is_none() && !seen.contains(parameter.name.as_str()) {
                return Err(ArgumentError::MissingNamedOnly {
                    keyword,
                    argument: parameter.name.clone(),
                });
            }
        }

        Ok(())
    }

    fn is_known_named(&self, name: &str) -> bool {
        self.positional_or_named
            .iter()
            .chain(&self.named_only)
            .any(|parameter| parameter.name == name)
    }

    /// Split `name=value` at the first unescaped separator, unless the name
    /// part is itself a variable reference.
    fn split_named<'a>(&self, value: &'a str) -> Option<(&'a str, &'a str)> {
        let mut escaped = false;
        for (offset, c) in value.char_indices() {
            match c {
                '\\' => escaped = !escaped,
                '=' if !escaped => {
                    let name = &value[..offset];
                    if name.contains("${") || name.contains("@{") || name.contains("&{") {
                        return None;
                    }
                    return Some((name, &value[offset + 1..]));
                }
                _ => escaped = false,
            }
        }
        None
    }
}

fn expected_range(min: usize, max: usize) -> String {
    if max == usize::MAX {
        format!("at least {min}")
    } else if min == max {
        format!("{min}")
    } else {
        format!("{min} to {max}")
    }
}
