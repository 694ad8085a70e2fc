//! SQL statement construction.
//!
//! A [`Statement`] is a backend-neutral list of SQL text and bound values.
//! The executor replays it into a `sqlx::QueryBuilder` for the pool's backend,
//! which owns placeholder syntax and argument order. Identifiers are always
//! double-quoted: table names such as `test-models` are not valid bare
//! identifiers. Only names taken from a descriptor ever reach
//! [`Statement::push_ident`].

use crate::db::params::QueryParam;

/// What the caller wants back from a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expect {
    /// Decoded rows, optionally capped at `limit` while streaming.
    Rows { limit: Option<usize> },
    /// Number of affected rows.
    RowsAffected,
}

/// One piece of a statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    Sql(String),
    Bind(QueryParam),
}

/// A statement ready for execution.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    fragments: Vec<Fragment>,
    pub expect: Expect,
    /// Mutating statements run inside a transaction that commits on success.
    pub mutating: bool,
}

impl Statement {
    pub fn new(expect: Expect, mutating: bool) -> Self {
        Self {
            fragments: Vec::new(),
            expect,
            mutating,
        }
    }

    /// A parameterless statement, e.g. DDL.
    pub fn raw(sql: impl Into<String>) -> Self {
        Self {
            fragments: vec![Fragment::Sql(sql.into())],
            expect: Expect::RowsAffected,
            mutating: true,
        }
    }

    pub fn push(&mut self, sql: &str) -> &mut Self {
        match self.fragments.last_mut() {
            Some(Fragment::Sql(text)) => text.push_str(sql),
            _ => self.fragments.push(Fragment::Sql(sql.to_string())),
        }
        self
    }

    pub fn push_ident(&mut self, ident: &str) -> &mut Self {
        self.push(&quote_ident(ident))
    }

    /// Push a comma-separated list of quoted identifiers.
    pub fn push_idents<'a>(&mut self, idents: impl IntoIterator<Item = &'a str>) -> &mut Self {
        for (i, ident) in idents.into_iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.push_ident(ident);
        }
        self
    }

    pub fn push_bind(&mut self, param: QueryParam) -> &mut Self {
        self.fragments.push(Fragment::Bind(param));
        self
    }

    /// Append `"col" = <bind>`, or `"col" IS NULL` for a null parameter.
    pub fn push_eq(&mut self, column: &str, param: QueryParam) -> &mut Self {
        self.push_ident(column);
        if param.is_null() {
            self.push(" IS NULL")
        } else {
            self.push(" = ").push_bind(param)
        }
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// Bound values in statement order.
    pub fn params(&self) -> impl Iterator<Item = &QueryParam> {
        self.fragments.iter().filter_map(|f| match f {
            Fragment::Bind(param) => Some(param),
            Fragment::Sql(_) => None,
        })
    }
}

/// Quote an identifier for PostgreSQL and SQLite.
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}
