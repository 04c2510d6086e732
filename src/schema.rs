use serde_json::Value;

use crate::error::SchemaIssue;

#[derive(Clone, Debug)]
pub enum Shape {
    Integer,
    String,
    NonEmptyString,
    Boolean,
    LocalDateTime,
    Nullable(Box<Shape>),
    Array(Box<Shape>),
    OneOf(Vec<Shape>),
    Object(Vec<Field>),
    Record(Box<Shape>),
    IdRecord(Box<Shape>),
}

#[derive(Clone, Debug)]
pub struct Field {
    pub name: &'static str,
    pub shape: Shape,
    pub required: bool,
}

pub fn required(name: &'static str, shape: Shape) -> Field {
    Field { name, shape, required: true }
}

pub fn optional(name: &'static str, shape: Shape) -> Field {
    Field { name, shape, required: false }
}

impl Shape {
    pub fn nullable(self) -> Self {
        Shape::Nullable(Box::new(self))
    }

    pub fn array_of(item: Shape) -> Self {
        Shape::Array(Box::new(item))
    }

    pub fn one_or_many(item: Shape) -> Self {
        Shape::OneOf(vec![item.clone(), Shape::array_of(item)])
    }

    pub fn describe(&self) -> String {
        match self {
            Shape::Integer => "integer".to_string(),
            Shape::String => "string".to_string(),
            Shape::NonEmptyString => "non-empty string".to_string(),
            Shape::Boolean => "boolean".to_string(),
            Shape::LocalDateTime => "local ISO-8601 date-time".to_string(),
            Shape::Nullable(inner) => format!("{} or null", inner.describe()),
            Shape::Array(item) => format!("array of {}", item.describe()),
            Shape::OneOf(options) => {
                options.iter().map(Shape::describe).collect::<Vec<_>>().join(" | ")
            },
            Shape::Object(_) => "object".to_string(),
            Shape::Record(value) => format!("object of key -> {}", value.describe()),
            Shape::IdRecord(value) => format!("object of id -> {}", value.describe()),
        }
    }
}

pub fn validate(value: &Value, shape: &Shape) -> Result<(), Vec<SchemaIssue>> {
    let mut issues = Vec::new();
    check(value, shape, "$", &mut issues);
    if issues.is_empty() { Ok(()) } else { Err(issues) }
}

fn check(value: &Value, shape: &Shape, path: &str, issues: &mut Vec<SchemaIssue>) {
    match shape {
        Shape::Integer => {
            if !(value.is_i64() || value.is_u64()) {
                issues.push(mismatch(path, shape, value));
            }
        },
        Shape::String => {
            if !value.is_string() {
                issues.push(mismatch(path, shape, value));
            }
        },
        Shape::NonEmptyString => match value.as_str() {
            Some(s) if !s.trim().is_empty() => {},
            _ => issues.push(mismatch(path, shape, value)),
        },
        Shape::Boolean => {
            if !value.is_boolean() {
                issues.push(mismatch(path, shape, value));
            }
        },
        Shape::LocalDateTime => match value.as_str() {
            Some(s) if s.trim().parse::<jiff::civil::DateTime>().is_ok() => {},
            _ => issues.push(mismatch(path, shape, value)),
        },
        Shape::Nullable(inner) => {
            if !value.is_null() {
                check(value, inner, path, issues);
            }
        },
        Shape::Array(item) => match value.as_array() {
            Some(items) => {
                for (i, item_value) in items.iter().enumerate() {
                    check(item_value, item, &format!("{path}[{i}]"), issues);
                }
            },
            None => issues.push(mismatch(path, shape, value)),
        },
        Shape::OneOf(options) => {
            let matched = options.iter().any(|option| {
                let mut scratch = Vec::new();
                check(value, option, path, &mut scratch);
                scratch.is_empty()
            });
            if !matched {
                issues.push(mismatch(path, shape, value));
            }
        },
        Shape::Object(fields) => {
            let Some(map) = value.as_object() else {
                issues.push(mismatch(path, shape, value));
                return;
            };
            for field in fields {
                let field_path = format!("{path}.{}", field.name);
                match map.get(field.name) {
                    Some(v) => check(v, &field.shape, &field_path, issues),
                    None if field.required => issues.push(SchemaIssue {
                        path: field_path,
                        expected: field.shape.describe(),
                        actual: "missing field".to_string(),
                    }),
                    None => {},
                }
            }
        },
        Shape::Record(value_shape) | Shape::IdRecord(value_shape) => {
            let Some(map) = value.as_object() else {
                issues.push(mismatch(path, shape, value));
                return;
            };
            let integer_keys = matches!(shape, Shape::IdRecord(_));
            for (key, v) in map {
                let entry_path = format!("{path}[{key:?}]");
                if integer_keys && key.parse::<i64>().is_err() {
                    issues.push(SchemaIssue {
                        path: entry_path.clone(),
                        expected: "integer-like key".to_string(),
                        actual: format!("key {key:?}"),
                    });
                }
                check(v, value_shape, &entry_path, issues);
            }
        },
    }
}

fn mismatch(path: &str, shape: &Shape, value: &Value) -> SchemaIssue {
    SchemaIssue { path: path.to_string(), expected: shape.describe(), actual: kind_of(value) }
}

fn kind_of(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(_) => "boolean".to_string(),
        Value::Number(n) if n.is_f64() => format!("number {n}"),
        Value::Number(n) => format!("integer {n}"),
        Value::String(s) if s.chars().count() > 40 => "string".to_string(),
        Value::String(s) => format!("string {s:?}"),
        Value::Array(_) => "array".to_string(),
        Value::Object(_) => "object".to_string(),
    }
}

pub fn movie_list() -> Shape {
    Shape::array_of(Shape::Object(vec![
        required("id", Shape::Integer),
        required("originalTitle", Shape::NonEmptyString),
    ]))
}

pub fn movies_meta() -> Shape {
    Shape::array_of(Shape::Object(vec![
        required("id", Shape::Integer),
        required("originalTitle", Shape::NonEmptyString),
        optional("directors", Shape::one_or_many(Shape::String).nullable()),
        optional("year", Shape::Integer.nullable()),
        optional("runtimeMin", Shape::Integer.nullable()),
        optional("runtime", Shape::String.nullable()),
        optional("url", Shape::String),
    ]))
}

pub fn locations() -> Shape {
    Shape::array_of(Shape::Object(vec![
        required("locationId", Shape::Integer),
        required("locationName", Shape::String),
    ]))
}

pub fn contests() -> Shape {
    Shape::array_of(Shape::Object(vec![
        required("contestId", Shape::Integer),
        required("contestName", Shape::String),
    ]))
}

pub fn screenings() -> Shape {
    Shape::array_of(Shape::Object(vec![
        required("movieIds", Shape::one_or_many(Shape::Integer).nullable()),
        optional("movieTitles", Shape::array_of(Shape::String)),
        required("contestId", Shape::Integer.nullable()),
        required("placeId", Shape::Integer.nullable()),
        required("startsAt", Shape::LocalDateTime),
        required("accreditationNeeded", Shape::Boolean.nullable()),
    ]))
}

pub fn tickets() -> Shape {
    Shape::array_of(Shape::Object(vec![
        required("screeningId", Shape::NonEmptyString),
        required("title", Shape::String),
        required("date", Shape::String),
        required("time", Shape::String),
        required("room", Shape::String),
        required("place", Shape::String),
        optional("locationName", Shape::String),
        optional("startsAt", Shape::LocalDateTime),
    ]))
}

pub fn contests_override() -> Shape {
    Shape::Object(vec![
        optional("$version", Shape::Integer),
        optional(
            "items",
            Shape::IdRecord(Box::new(Shape::Object(vec![
                optional("isVisibleInFilters", Shape::Boolean),
                optional("order", Shape::Integer),
                optional("name", Shape::String),
            ]))),
        ),
    ])
}

pub fn runtimes_override() -> Shape {
    Shape::Object(vec![
        optional("$version", Shape::Integer),
        optional(
            "runtimes",
            Shape::Record(Box::new(Shape::OneOf(vec![Shape::Integer, Shape::String]))),
        ),
    ])
}
