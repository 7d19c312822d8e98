mod delete;
mod exists;
mod find;
mod save;
mod update;

use crate::{
    Connection, Entity, Error, Result, Store, Value, Verb, parser, schema::create_table_sql,
    validate,
};
use std::marker::PhantomData;

/// One derived-query invocation: the method name plus whatever payload its
/// verb needs. `entity` feeds `save`, `values` feeds `updateBy...`, `args`
/// binds the predicate placeholders in name order.
pub struct MethodCall<'a, E> {
    pub name: &'a str,
    pub entity: Option<&'a E>,
    pub values: &'a [(&'a str, Value)],
    pub args: &'a [Value],
}

impl<'a, E> MethodCall<'a, E> {
    pub fn new(name: &'a str) -> Self {
        Self {
            name,
            entity: None,
            values: &[],
            args: &[],
        }
    }

    pub fn with_entity(mut self, entity: &'a E) -> Self {
        self.entity = Some(entity);
        self
    }

    pub fn with_values(mut self, values: &'a [(&'a str, Value)]) -> Self {
        self.values = values;
        self
    }

    pub fn with_args(mut self, args: &'a [Value]) -> Self {
        self.args = args;
        self
    }
}

/// What a dispatched call produced, shaped by its verb.
#[derive(Debug)]
pub enum Outcome<E> {
    Saved(E),
    Found(Vec<E>),
    One(Option<E>),
    Affected(u64),
    Exists(bool),
}

/// Typed access point for one entity type over one store.
///
/// Opening a repository checks the entity metadata and issues the
/// idempotent DDL, related tables first so foreign keys have something to
/// point at. All operations run through [`Repository::dispatch`], either
/// directly with a [`MethodCall`] or through the typed wrappers.
pub struct Repository<'a, E, S> {
    store: &'a S,
    entity: PhantomData<E>,
}

impl<'a, E: Entity, S: Store> Repository<'a, E, S> {
    pub fn open(store: &'a S) -> Result<Self> {
        let def = E::table_def();
        def.check()?;
        let conn = store.writable()?;
        for join in def.joins {
            let related = (join.related)();
            let sql = create_table_sql(related)?;
            log::debug!("schema: {}", sql);
            conn.execute(&sql)?;
        }
        let sql = create_table_sql(def)?;
        log::debug!("schema: {}", sql);
        conn.execute(&sql)?;
        Ok(Self {
            store,
            entity: PhantomData,
        })
    }

    /// Route a method call to its handler by parsed verb.
    pub fn dispatch(&self, call: MethodCall<'_, E>) -> Result<Outcome<E>> {
        let def = E::table_def();
        let parsed = parser::parse(call.name)?;
        match parsed.verb {
            Verb::Save => {
                let entity = call
                    .entity
                    .ok_or_else(|| Error::syntax("save requires an entity"))?;
                let conn = self.store.writable()?;
                let record = save::save(conn, def, entity.to_record())?;
                Ok(Outcome::Saved(E::from_record(&record)?))
            }
            Verb::FindAll | Verb::FindAllOrderBy | Verb::FindAllBy => {
                let conn = self.store.readable()?;
                let records = find::find(conn, def, &parsed, call.args)?;
                let entities = records
                    .iter()
                    .map(E::from_record)
                    .collect::<Result<Vec<_>>>()?;
                Ok(Outcome::Found(entities))
            }
            Verb::FindBy => {
                let conn = self.store.readable()?;
                let records = find::find(conn, def, &parsed, call.args)?;
                let entity = records.first().map(E::from_record).transpose()?;
                Ok(Outcome::One(entity))
            }
            Verb::ExistsBy => {
                let conn = self.store.readable()?;
                Ok(Outcome::Exists(exists::exists(conn, def, &parsed, call.args)?))
            }
            Verb::DeleteBy => {
                let conn = self.store.writable()?;
                Ok(Outcome::Affected(delete::delete(
                    conn, def, &parsed, call.args,
                )?))
            }
            Verb::UpdateBy => {
                let conn = self.store.writable()?;
                Ok(Outcome::Affected(update::update(
                    conn,
                    def,
                    &parsed,
                    call.values,
                    call.args,
                )?))
            }
        }
    }

    /// Insert the entity and return it with any engine-assigned key set.
    pub fn save(&self, entity: &E) -> Result<E> {
        let conn = self.store.writable()?;
        let record = save::save(conn, E::table_def(), entity.to_record())?;
        E::from_record(&record)
    }

    pub fn find_all(&self) -> Result<Vec<E>> {
        self.find("findAll", &[])
    }

    /// Run a find-family method name (`findAll...`, `findBy...`) and
    /// collect the matches.
    pub fn find(&self, name: &str, args: &[Value]) -> Result<Vec<E>> {
        match self.dispatch(MethodCall::new(name).with_args(args))? {
            Outcome::Found(entities) => Ok(entities),
            Outcome::One(entity) => Ok(entity.into_iter().collect()),
            _ => Err(Error::syntax(format!("'{}' is not a find method", name))),
        }
    }

    /// Run a find-family method name and keep the first match.
    pub fn find_one(&self, name: &str, args: &[Value]) -> Result<Option<E>> {
        Ok(self.find(name, args)?.into_iter().next())
    }

    /// Run an `updateBy...` method name with a field→value assignment map.
    pub fn update(
        &self,
        name: &str,
        values: &[(&str, Value)],
        args: &[Value],
    ) -> Result<u64> {
        match self.dispatch(MethodCall::new(name).with_values(values).with_args(args))? {
            Outcome::Affected(count) => Ok(count),
            _ => Err(Error::syntax(format!("'{}' is not an update method", name))),
        }
    }

    /// Run a `deleteBy...` method name.
    pub fn delete(&self, name: &str, args: &[Value]) -> Result<u64> {
        match self.dispatch(MethodCall::new(name).with_args(args))? {
            Outcome::Affected(count) => Ok(count),
            _ => Err(Error::syntax(format!("'{}' is not a delete method", name))),
        }
    }

    /// Run an `existsBy...` method name.
    pub fn exists(&self, name: &str, args: &[Value]) -> Result<bool> {
        match self.dispatch(MethodCall::new(name).with_args(args))? {
            Outcome::Exists(exists) => Ok(exists),
            _ => Err(Error::syntax(format!("'{}' is not an exists method", name))),
        }
    }

    /// Check the entity against its constraints, reporting every violation
    /// at once.
    pub fn validate(&self, entity: &E) -> Result<()> {
        let conn = self.store.readable()?;
        validate::validate(conn, E::table_def(), &entity.to_record())
    }

    /// `validate` collapsed to a boolean; non-validation failures still
    /// propagate.
    pub fn is_valid(&self, entity: &E) -> Result<bool> {
        match self.validate(entity) {
            Ok(()) => Ok(true),
            Err(Error::Validation(..)) => Ok(false),
            Err(other) => Err(other),
        }
    }

    /// Run a hand-written SELECT with `?` placeholders and map its rows
    /// through the entity metadata.
    pub fn query_raw(&self, sql: &str, args: &[Value]) -> Result<Vec<E>> {
        let conn = self.store.readable()?;
        let records = find::rows(conn, E::table_def(), sql, args)?;
        records.iter().map(E::from_record).collect()
    }

    /// `query_raw` keeping only the first row.
    pub fn query_raw_one(&self, sql: &str, args: &[Value]) -> Result<Option<E>> {
        Ok(self.query_raw(sql, args)?.into_iter().next())
    }

    /// Run a hand-written statement that produces no rows. The `?`
    /// placeholders are substituted with SQL literals before execution, so
    /// only arguments with a literal form are accepted.
    ///
    /// Placeholders are found textually, so a `?` inside a quoted string
    /// counts as one; pass such text as an argument instead of inlining it.
    pub fn execute_raw(&self, sql: &str, args: &[Value]) -> Result<()> {
        let sql = substitute_literals(sql, args)?;
        log::debug!("execute: {}", sql);
        self.store.writable()?.execute(&sql)
    }
}

/// Replace each `?` in the statement with the literal form of the matching
/// argument. The counts must agree.
fn substitute_literals(sql: &str, args: &[Value]) -> Result<String> {
    let placeholders = sql.matches('?').count();
    if placeholders != args.len() {
        return Err(Error::syntax(format!(
            "statement has {} placeholder(s) but {} argument(s) were supplied",
            placeholders,
            args.len()
        )));
    }
    let mut out = String::with_capacity(sql.len());
    let mut args = args.iter();
    let mut parts = sql.split('?');
    if let Some(first) = parts.next() {
        out.push_str(first);
    }
    for part in parts {
        if let Some(arg) = args.next() {
            arg.write_literal(&mut out)?;
        }
        out.push_str(part);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_substitution() {
        let sql = substitute_literals(
            "UPDATE \"products\" SET \"name\" = ? WHERE \"id\" = ?",
            &[Value::from("o'brien"), Value::from(7i64)],
        )
        .unwrap();
        assert_eq!(
            sql,
            "UPDATE \"products\" SET \"name\" = 'o''brien' WHERE \"id\" = 7"
        );
    }

    #[test]
    fn placeholder_count_mismatch() {
        assert!(matches!(
            substitute_literals("DELETE FROM \"t\" WHERE \"id\" = ?", &[]),
            Err(Error::QuerySyntax(..))
        ));
    }
}
