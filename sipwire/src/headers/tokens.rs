use std::fmt;
use std::ops::Deref;

use itertools::Itertools;
use util::ArcStr;

use crate::error::ParseResult;
use crate::headers::HeaderParse;
use crate::macros::comma_separated;
use crate::parser::Parser;

/// A comma separated list of tokens.
///
/// Used for `Allow`, `Supported`, `Require`, `Unsupported` and
/// `Proxy-Require`. An empty value gives an empty list.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct TokenList(Vec<ArcStr>);

impl TokenList {
    /// Appends the tokens of `other`.
    pub fn extend(&mut self, other: TokenList) {
        self.0.extend(other.0)
    }

    /// Returns `true` if `token` is in the list, ignoring case.
    pub fn contains_token(&self, token: &str) -> bool {
        self.0.iter().any(|t| t.eq_ignore_ascii_case(token))
    }
}

impl Deref for TokenList {
    type Target = [ArcStr];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for TokenList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.iter().format(", "))
    }
}

impl HeaderParse for TokenList {
    fn parse(parser: &mut Parser<'_>) -> ParseResult<Self> {
        let mut tokens = Vec::new();

        parser.lws();
        if parser.peek().is_none() {
            return Ok(TokenList(tokens));
        }
        comma_separated!(parser => {
            tokens.push(parser.parse_token("token")?.into())
        });

        Ok(TokenList(tokens))
    }
}
