use sqlx::{Postgres, QueryBuilder};

/// Free-text search terms: whitespace-separated, lowercased, empties dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovieFilter {
    pub terms: Vec<String>,
}

impl MovieFilter {
    pub fn from_query(query: &str) -> Self {
        Self {
            terms: query.split_whitespace().map(str::to_lowercase).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Appends `AND (<term matches title|director|plot> OR ...)`; nothing for an empty filter.
    pub fn push_predicate(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        if self.is_empty() {
            return;
        }
        qb.push(" AND (");
        for (i, term) in self.terms.iter().enumerate() {
            if i > 0 {
                qb.push(" OR ");
            }
            let pattern = like_pattern(term);
            qb.push("title ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR director ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR plot ILIKE ")
                .push_bind(pattern);
        }
        qb.push(")");
    }
}

/// `%term%` with LIKE metacharacters escaped so they match literally.
pub fn like_pattern(term: &str) -> String {
    let mut out = String::with_capacity(term.len() + 2);
    out.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}
