use crate::BUILTIN_LIBRARY_NAME;

/// BuiltIn keywords whose arguments are themselves keyword calls.
///
/// The classification drives the analyzer's state machine: it decides how
/// many leading arguments belong to the wrapper keyword and where the
/// nested keyword name starts.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RunKeywordFamily {
    None,
    /// `Run Keyword` and its unconditional variants: the first argument is
    /// the nested keyword name.
    RunKeyword,
    /// `Run Keywords`: every argument is a keyword name, optionally
    /// segmented by literal `AND` separators.
    RunKeywords,
    /// `Run Keyword If` with its `ELSE`/`ELSE IF` branch syntax.
    RunKeywordIf,
    /// Variants carrying leading condition arguments; the payload is the
    /// number of arguments preceding the nested keyword name.
    RunKeywordWithCondition(u8),
}

const RUN_KEYWORD_NAMES: &[&str] = &[
    "Run Keyword",
    "Run Keyword And Continue On Failure",
    "Run Keyword And Ignore Error",
    "Run Keyword And Return",
    "Run Keyword And Return Status",
    "Run Keyword If All Critical Tests Passed",
    "Run Keyword If All Tests Passed",
    "Run Keyword If Any Critical Tests Failed",
    "Run Keyword If Any Tests Failed",
    "Run Keyword If Test Failed",
    "Run Keyword If Test Passed",
    "Run Keyword If Timeout Occurred",
];

const RUN_KEYWORD_WITH_CONDITION_NAMES: &[(&str, u8)] = &[
    ("Run Keyword And Expect Error", 1),
    ("Run Keyword And Return If", 1),
    ("Run Keyword Unless", 1),
    ("Repeat Keyword", 1),
    ("Wait Until Keyword Succeeds", 2),
];

const RUN_KEYWORDS_NAME: &str = "Run Keywords";
const RUN_KEYWORD_IF_NAME: &str = "Run Keyword If";

impl RunKeywordFamily {
    /// Classify a keyword by its owning library and canonical name.
    ///
    /// Only BuiltIn participates; user keywords shadowing these names are
    /// ordinary keywords.
    pub fn classify(libname: &str, name: &str) -> Self {
        if libname != BUILTIN_LIBRARY_NAME {
            return Self::None;
        }
        if name == RUN_KEYWORD_IF_NAME {
            return Self::RunKeywordIf;
        }
        if name == RUN_KEYWORDS_NAME {
            return Self::RunKeywords;
        }
        if RUN_KEYWORD_NAMES.contains(&name) {
            return Self::RunKeyword;
        }
        if let Some(&(_, count)) = RUN_KEYWORD_WITH_CONDITION_NAMES
            .iter()
            .find(|(candidate, _)| *candidate == name)
        {
            return Self::RunKeywordWithCondition(count);
        }
        Self::None
    }

    /// The number of leading arguments consumed by the wrapper keyword
    /// itself (condition arguments plus the nested keyword name).
    pub fn args_to_process(self) -> Option<u32> {
        match self {
            Self::None => None,
            Self::RunKeyword => Some(1),
            Self::RunKeywords => Some(0),
            Self::RunKeywordIf => Some(2),
            Self::RunKeywordWithCondition(count) => Some(u32::from(count) + 1),
        }
    }

    /// Number of condition arguments preceding the nested keyword name.
    pub fn condition_count(self) -> usize {
        match self {
            Self::RunKeywordWithCondition(count) => count as usize,
            _ => 0,
        }
    }
}
