use once_cell::sync::Lazy;
use regex::Regex;

static EMBEDDED_ARG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([^{}]+?)\}").expect("valid embedded-argument pattern"));

/// Whether a declared keyword name contains embedded `${...}` arguments.
pub fn is_embedded_keyword(name: &str) -> bool {
    EMBEDDED_ARG_PATTERN.is_match(name)
}

/// Matcher for keywords whose declared name embeds its arguments.
///
/// The declared name is compiled into an anchored, case-insensitive regular
/// expression where every `${var}` placeholder matches `.+?`. A placeholder
/// may carry a custom pattern (`${var:\d+}`); only the part before the
/// colon names the argument and the custom pattern does not narrow the
/// match.
#[derive(Debug, Clone)]
pub struct EmbeddedArguments {
    pub args: Vec<String>,
    pattern: Regex,
}

impl EmbeddedArguments {
    /// Build the matcher, or `None` for names without placeholders.
    pub fn parse(name: &str) -> Option<Self> {
        if !is_embedded_keyword(name) {
            return None;
        }

        let mut args = Vec::new();
        let mut pattern = String::from("(?i)^");
        let mut last = 0;
        for capture in EMBEDDED_ARG_PATTERN.captures_iter(name) {
            let whole = capture.get(0).expect("match has a full capture");
            let inner = &capture[1];
            let arg_name = inner.split_once(':').map_or(inner, |(name, _)| name);
            args.push(arg_name.to_string());
            pattern.push_str(&regex::escape(&name[last..whole.start()]));
            pattern.push_str("(.+?)");
            last = whole.end();
        }
        pattern.push_str(&regex::escape(&name[last..]));
        pattern.push('$');

        let pattern = Regex::new(&pattern).ok()?;
        Some(Self { args, pattern })
    }

    pub fn matches(&self, name: &str) -> bool {
        self.pattern.is_match(name)
    }

    /// The embedded argument values captured from a matching call name.
    pub fn extract<'a>(&self, name: &'a str) -> Option<Vec<&'a str>> {
        let captures = self.pattern.captures(name)?;
        Some(
            captures
                .iter()
                .skip(1)
                .filter_map(|group| group.map(|m| m.as_str()))
                .collect(),
        )
    }
}
