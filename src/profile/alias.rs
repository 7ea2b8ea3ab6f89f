// Shopline CLI — Store aliases
//
// `SHOPLINE_STORE_ALIASES="ds:demoshop,ts:testshop"` lets operators type a
// short alias wherever a store selector is accepted.

/// Parsed alias → profile-selector pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreAliases {
    pairs: Vec<(String, String)>,
}

impl StoreAliases {
    /// Parse `alias:target` pairs separated by commas. Malformed pairs are
    /// ignored.
    pub fn parse(raw: &str) -> Self {
        let pairs = raw
            .split(',')
            .filter_map(|pair| pair.split_once(':'))
            .map(|(alias, target)| (alias.trim().to_string(), target.trim().to_string()))
            .filter(|(alias, target)| !alias.is_empty() && !target.is_empty())
            .collect();
        Self { pairs }
    }

    /// The target for `name` (alias match is case-insensitive), or `name`
    /// unchanged.
    pub fn expand<'a>(&'a self, name: &'a str) -> &'a str {
        self.pairs
            .iter()
            .find(|(alias, _)| alias.eq_ignore_ascii_case(name))
            .map(|(_, target)| target.as_str())
            .unwrap_or(name)
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
