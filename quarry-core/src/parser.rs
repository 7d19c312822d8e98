use crate::{Error, Result, lower_first, split_camel_case};

/// The operation family a method name routes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Save,
    FindAll,
    FindAllOrderBy,
    FindAllBy,
    FindBy,
    ExistsBy,
    DeleteBy,
    UpdateBy,
}

impl Verb {
    /// Whether the verb carries a predicate and therefore requires at least
    /// one field term.
    pub fn requires_predicate(&self) -> bool {
        !matches!(self, Verb::Save | Verb::FindAll | Verb::FindAllOrderBy)
    }
}

/// Logical connector between two adjacent predicate terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connector {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// Structured form of a derived-query method name.
///
/// `terms` holds the predicate field tokens in call order; `connectors` sits
/// between consecutive terms, so it is always one element shorter.
#[derive(Debug, PartialEq)]
pub struct ParsedQuery {
    pub verb: Verb,
    pub terms: Vec<String>,
    pub connectors: Vec<Connector>,
    pub order: Option<(String, Direction)>,
}

/// Parse a derived-query method name such as `findByNameAndActive` or
/// `findAllByLineOrderByNameDesc`.
///
/// Verb prefixes are matched longest first, so `findAllOrderByName` routes
/// to `FindAllOrderBy` rather than to `FindAll` with trailing garbage.
pub fn parse(name: &str) -> Result<ParsedQuery> {
    let (verb, predicate, order) = split_verb(name)?;
    let (terms, connectors) = split_predicate(predicate);
    if verb.requires_predicate() && terms.is_empty() {
        return Err(Error::syntax(format!(
            "method '{}' requires at least one predicate field",
            name
        )));
    }
    if !terms.is_empty() && connectors.len() != terms.len() - 1 {
        return Err(Error::syntax(format!(
            "method '{}' has a dangling connector",
            name
        )));
    }
    if !verb.requires_predicate() && !predicate.is_empty() {
        return Err(Error::syntax(format!(
            "method '{}' does not take a predicate",
            name
        )));
    }
    let order = order.map(|suffix| parse_order(name, suffix)).transpose()?;
    Ok(ParsedQuery {
        verb,
        terms,
        connectors,
        order,
    })
}

/// Split the name into verb, predicate chunk and optional order chunk.
fn split_verb(name: &str) -> Result<(Verb, &str, Option<&str>)> {
    if let Some(rest) = name.strip_prefix("findAllOrderBy") {
        return Ok((Verb::FindAllOrderBy, "", Some(rest)));
    }
    if let Some(rest) = name.strip_prefix("findAllBy") {
        return Ok(match rest.split_once("OrderBy") {
            Some((predicate, order)) => (Verb::FindAllBy, predicate, Some(order)),
            None => (Verb::FindAllBy, rest, None),
        });
    }
    if name == "findAll" {
        return Ok((Verb::FindAll, "", None));
    }
    if name == "save" {
        return Ok((Verb::Save, "", None));
    }
    if let Some(rest) = name.strip_prefix("findBy") {
        return Ok((Verb::FindBy, rest, None));
    }
    if let Some(rest) = name.strip_prefix("existsBy") {
        return Ok((Verb::ExistsBy, rest, None));
    }
    if let Some(rest) = name.strip_prefix("deleteBy") {
        return Ok((Verb::DeleteBy, rest, None));
    }
    if let Some(rest) = name.strip_prefix("updateBy") {
        return Ok((Verb::UpdateBy, rest, None));
    }
    Err(Error::syntax(format!(
        "method '{}' does not match any supported operation",
        name
    )))
}

/// Break a camelCase predicate chunk into field terms and connectors.
/// Consecutive words that are not `And`/`Or` fuse back into one multi-word
/// field token, so `ProductLine` stays a single term.
fn split_predicate(predicate: &str) -> (Vec<String>, Vec<Connector>) {
    let mut terms: Vec<String> = Vec::new();
    let mut connectors = Vec::new();
    let mut open = false;
    for word in split_camel_case(predicate) {
        let connector = match word {
            "And" => Some(Connector::And),
            "Or" => Some(Connector::Or),
            _ => None,
        };
        match connector {
            Some(connector) if open => {
                connectors.push(connector);
                open = false;
            }
            _ => {
                if open {
                    // continuation of a multi-word field name
                    if let Some(term) = terms.last_mut() {
                        term.push_str(word);
                    }
                } else {
                    terms.push(lower_first(word));
                    open = true;
                }
            }
        }
    }
    (terms, connectors)
}

fn parse_order(name: &str, suffix: &str) -> Result<(String, Direction)> {
    let (field, direction) = if let Some(field) = suffix.strip_suffix("Desc") {
        (field, Direction::Desc)
    } else if let Some(field) = suffix.strip_suffix("Asc") {
        (field, Direction::Asc)
    } else {
        (suffix, Direction::Asc)
    };
    if field.is_empty() {
        return Err(Error::syntax(format!(
            "method '{}' has an OrderBy suffix without a field",
            name
        )));
    }
    Ok((lower_first(field), direction))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_find_by() {
        let parsed = parse("findByName").unwrap();
        assert_eq!(parsed.verb, Verb::FindBy);
        assert_eq!(parsed.terms, ["name"]);
        assert!(parsed.connectors.is_empty());
        assert_eq!(parsed.order, None);
    }

    #[test]
    fn multi_term_with_connectors() {
        let parsed = parse("findAllByNameAndProductLineOrActive").unwrap();
        assert_eq!(parsed.verb, Verb::FindAllBy);
        assert_eq!(parsed.terms, ["name", "productLine", "active"]);
        assert_eq!(parsed.connectors, [Connector::And, Connector::Or]);
    }

    #[test]
    fn order_suffixes() {
        let parsed = parse("findAllByActiveOrderByNameDesc").unwrap();
        assert_eq!(parsed.verb, Verb::FindAllBy);
        assert_eq!(parsed.terms, ["active"]);
        assert_eq!(parsed.order, Some(("name".into(), Direction::Desc)));

        let parsed = parse("findAllOrderByName").unwrap();
        assert_eq!(parsed.verb, Verb::FindAllOrderBy);
        assert!(parsed.terms.is_empty());
        assert_eq!(parsed.order, Some(("name".into(), Direction::Asc)));
    }

    #[test]
    fn longest_prefix_wins() {
        assert_eq!(parse("findAll").unwrap().verb, Verb::FindAll);
        assert_eq!(parse("findAllByName").unwrap().verb, Verb::FindAllBy);
        assert_eq!(
            parse("findAllOrderByIdAsc").unwrap().verb,
            Verb::FindAllOrderBy
        );
    }

    #[test]
    fn other_verbs() {
        assert_eq!(parse("existsByName").unwrap().verb, Verb::ExistsBy);
        assert_eq!(parse("deleteById").unwrap().verb, Verb::DeleteBy);
        assert_eq!(parse("updateById").unwrap().verb, Verb::UpdateBy);
        assert_eq!(parse("save").unwrap().verb, Verb::Save);
    }

    #[test]
    fn malformed_names_are_rejected() {
        assert!(matches!(parse("fetchByName"), Err(Error::QuerySyntax(..))));
        assert!(matches!(parse("findBy"), Err(Error::QuerySyntax(..))));
        assert!(matches!(
            parse("findAllOrderBy"),
            Err(Error::QuerySyntax(..))
        ));
        assert!(matches!(
            parse("findAllByNameOrderBy"),
            Err(Error::QuerySyntax(..))
        ));
        assert!(matches!(parse("findAllExtra"), Err(Error::QuerySyntax(..))));
        assert!(matches!(parse("findByNameAnd"), Err(Error::QuerySyntax(..))));
    }
}
