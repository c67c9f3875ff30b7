use std::fmt;
use std::str::FromStr;

use util::chars::is_token;
use util::ArcStr;

use crate::error::GrammarFault;
use crate::parser::Parser;

/// An ordered multimap of SIP parameters.
///
/// A parameter takes the form `name[=value]` and can appear either as a URI
/// parameter or as a header parameter. Names are stored lowercased, values
/// keep their case. Two collections are equal when they hold the same set of
/// parameters, regardless of order.
#[derive(Debug, Default, Clone)]
pub struct Params {
    inner: Vec<Param>,
}

impl Params {
    /// Creates an empty `Params`.
    pub fn new() -> Self {
        Self { inner: Vec::new() }
    }

    /// Returns the number of parameters.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Checks if the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Gets the value of the first parameter called `name`.
    ///
    /// Returns `None` both when the parameter is absent and when it has no
    /// value, use [`Params::contains`] to tell them apart.
    pub fn get_named(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Param::value)
    }

    /// Gets the first parameter called `name`, ignoring case.
    pub fn get(&self, name: &str) -> Option<&Param> {
        self.inner.iter().find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Returns `true` if a parameter called `name` is present.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Returns an iterator over the parameters, in wire order.
    pub fn iter(&self) -> impl Iterator<Item = &Param> {
        self.inner.iter()
    }

    /// Pushes a new parameter into collection.
    pub fn push(&mut self, param: Param) {
        self.inner.push(param)
    }
}

impl PartialEq for Params {
    fn eq(&self, other: &Self) -> bool {
        self.inner.iter().all(|p| other.inner.contains(p)) && other.inner.iter().all(|p| self.inner.contains(p))
    }
}

impl Eq for Params {}

impl fmt::Display for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for param in &self.inner {
            write!(f, ";{param}")?;
        }
        Ok(())
    }
}

impl<'a, const N: usize> From<[(&'a str, &'a str); N]> for Params {
    fn from(params: [(&'a str, &'a str); N]) -> Self {
        let inner = params.map(|(name, value)| Param::new(name, Some(value))).to_vec();

        Self { inner }
    }
}

/// A single parameter.
///
/// # Examples
///
/// ```
/// use sipwire::message::Param;
///
/// let param: Param = "Transport=TCP".parse().unwrap();
///
/// assert_eq!(param.name(), "transport");
/// assert_eq!(param.value(), Some("TCP"));
/// ```
#[derive(Debug, PartialEq, Eq, Default, Clone)]
pub struct Param {
    /// The parameter name, lowercased.
    pub(crate) name: ArcStr,
    /// The parameter optional value.
    pub(crate) value: Option<ArcStr>,
}

impl Param {
    /// Creates a new `Param` with the given `name` and optional `value`.
    pub fn new(name: &str, value: Option<&str>) -> Self {
        Self {
            name: name.to_ascii_lowercase().into(),
            value: value.map(|v| v.into()),
        }
    }

    /// Returns the param `name`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the param `value` if any.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        match self.value.as_deref() {
            None => Ok(()),
            Some(value) if needs_quotes(value) => write!(f, "={}", Quoted(value)),
            Some(value) => write!(f, "={value}"),
        }
    }
}

/// Writes a `quoted-string`, escaping `"` and `\`.
pub(crate) struct Quoted<'a>(pub(crate) &'a str);

impl fmt::Display for Quoted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("\"")?;
        for c in self.0.chars() {
            if c == '"' || c == '\\' {
                f.write_str("\\")?;
            }
            write!(f, "{c}")?;
        }
        f.write_str("\"")
    }
}

fn needs_quotes(value: &str) -> bool {
    value.is_empty() || value.bytes().any(|b| !is_token(b) && !b"[]:/&+$".contains(&b))
}

impl FromStr for Param {
    type Err = GrammarFault;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parser = Parser::new(s);
        let param = parser.parse_param()?;
        parser.finish()?;

        Ok(param)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_display() {
        let params = Params::from([("param1", "value1"), ("param2", "two words")]);

        assert_eq!(params.to_string(), ";param1=value1;param2=\"two words\"");
    }

    #[test]
    fn test_params_get_named() {
        let mut params = Params::from([("param1", "value1")]);
        params.push(Param::new("lr", None));

        assert_eq!(params.get_named("PARAM1"), Some("value1"));
        assert_eq!(params.get_named("lr"), None);
        assert!(params.contains("lr"));
        assert!(!params.contains("param3"));
    }

    #[test]
    fn test_params_equality_ignores_order() {
        let a = Params::from([("a", "1"), ("b", "2")]);
        let b = Params::from([("b", "2"), ("a", "1")]);
        let c = Params::from([("a", "1")]);

        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
