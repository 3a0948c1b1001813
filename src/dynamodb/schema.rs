use serde_json::{Number, Value};

/// The fields a schedule entry is expected to carry.
///
/// DynamoDB itself is schemaless: apart from the key, items may have any
/// attributes. The schema is an application-side description used to prompt
/// for values and to turn typed-in text into the right JSON type.
///
/// Fields keep the order in which they were added.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<(String, FieldType)>,
}

/// The type of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Number,
    Boolean,
}

impl FieldType {
    /// Parses user input for a field of this type.
    ///
    /// Returns `None` when the text cannot be read as this type.
    pub fn parse(&self, input: &str) -> Option<Value> {
        let input = input.trim();
        match self {
            FieldType::String => Some(Value::String(input.to_string())),
            FieldType::Number => input
                .parse::<i64>()
                .map(Number::from)
                .ok()
                .or_else(|| input.parse::<f64>().ok().and_then(Number::from_f64))
                .map(Value::Number),
            FieldType::Boolean => match input.to_lowercase().as_str() {
                "true" | "yes" | "y" => Some(Value::Bool(true)),
                "false" | "no" | "n" => Some(Value::Bool(false)),
                _ => None,
            },
        }
    }
}

impl Schema {
    /// Creates a new empty `Schema`.
    pub fn new() -> Self {
        Self::default()
    }

    /// The fields of a TV schedule entry.
    pub fn tv_schedule() -> Self {
        Self::new()
            .add_field("title", FieldType::String)
            .add_field("channel", FieldType::String)
            .add_field("startTime", FieldType::String)
            .add_field("durationMinutes", FieldType::Number)
            .add_field("live", FieldType::Boolean)
    }

    /// Adds a field to the schema and returns the modified `Schema`.
    ///
    /// Adding a field twice replaces its type in place.
    pub fn add_field(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        let name = name.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = field_type,
            None => self.fields.push((name, field_type)),
        }
        self
    }

    /// Returns the fields in declaration order.
    pub fn fields(&self) -> &[(String, FieldType)] {
        &self.fields
    }

    pub fn field_type(&self, name: &str) -> Option<FieldType> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, field_type)| *field_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_schema_operations() {
        let schema = Schema::new()
            .add_field("field1", FieldType::String)
            .add_field("field2", FieldType::Number)
            .add_field("field1", FieldType::Boolean);

        let fields = schema.fields();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0], ("field1".to_string(), FieldType::Boolean));
        assert_eq!(schema.field_type("field2"), Some(FieldType::Number));
        assert_eq!(schema.field_type("missing"), None);
    }

    #[test]
    fn test_field_type_parse() {
        assert_eq!(FieldType::String.parse(" News "), Some(json!("News")));
        assert_eq!(FieldType::Number.parse("30"), Some(json!(30)));
        assert_eq!(FieldType::Number.parse("1.5"), Some(json!(1.5)));
        assert_eq!(FieldType::Number.parse("thirty"), None);
        assert_eq!(FieldType::Boolean.parse("Yes"), Some(json!(true)));
        assert_eq!(FieldType::Boolean.parse("n"), Some(json!(false)));
        assert_eq!(FieldType::Boolean.parse("maybe"), None);
    }

    #[test]
    fn test_tv_schedule_schema() {
        let schema = Schema::tv_schedule();
        let names: Vec<&str> = schema
            .fields()
            .iter()
            .map(|(name, _)| name.as_str())
            .collect();
        assert_eq!(
            names,
            vec!["title", "channel", "startTime", "durationMinutes", "live"]
        );
    }
}
