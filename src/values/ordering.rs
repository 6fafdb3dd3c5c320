use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    field: String,
    direction: SortDirection,
}

impl Sort {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    /// `+field` or `-field`; anything else yields `None`.
    fn parse(segment: &str) -> Option<Self> {
        let direction = match segment.chars().next()? {
            '+' => SortDirection::Asc,
            '-' => SortDirection::Desc,
            _ => return None,
        };
        let field = &segment[1..];
        if field.is_empty() {
            return None;
        }
        Some(Self::new(field, direction))
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn direction(&self) -> SortDirection {
        self.direction
    }
}

/// Sort directives parsed from a `+a,-b` list.
///
/// Parsing is purely syntactic: field names are not checked against any
/// column list. Storage adapters must map them through their own allow-list
/// (see [`Sorts::map_fields`]) before the names reach query text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sorts(Vec<Sort>);

impl Sorts {
    /// Malformed segments are dropped silently; callers rely on the
    /// well-formed ones still applying.
    pub fn parse(raw: &str) -> Self {
        Self(
            raw.split(',')
                .filter(|s| !s.is_empty())
                .filter_map(Sort::parse)
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sort> {
        self.0.iter()
    }

    /// Renames every field through `f`, dropping the ones it rejects.
    pub fn map_fields<F>(&self, f: F) -> Self
    where
        F: Fn(&str) -> Option<&'static str>,
    {
        Self(
            self.0
                .iter()
                .filter_map(|s| f(s.field.as_str()).map(|column| Sort::new(column, s.direction)))
                .collect(),
        )
    }

    /// `"{prefix.}{field} {ASC|DESC}"` per directive.
    pub fn fragments(&self, prefix: Option<&str>) -> Vec<String> {
        let prefix = match prefix {
            Some(p) if !p.is_empty() => format!("{p}."),
            _ => String::new(),
        };
        self.0
            .iter()
            .map(|s| format!("{prefix}{} {}", s.field, s.direction))
            .collect()
    }
}
