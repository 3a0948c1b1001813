use std::collections::HashMap;
use thiserror::Error;

/// Prefix of the placeholder that stands in for an attribute name.
pub const NAME_PLACEHOLDER_PREFIX: &str = "#f";
/// Prefix of the placeholder that stands in for an attribute value.
pub const VALUE_PLACEHOLDER_PREFIX: &str = ":v";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UpdateExpressionError {
    #[error("an update expression needs at least one field")]
    NoFields,
}

/// The three artifacts a DynamoDB `UpdateItem` call needs for a partial update.
///
/// Each field of the input becomes one `SET` action. Both the attribute name and
/// the value are addressed through placeholders, so field names that happen to be
/// DynamoDB reserved words (`name`, `date`, `status`, ...) are always safe.
///
/// Placeholders are positional (`#f0`/`:v0`, `#f1`/`:v1`, ...), which means they
/// never depend on the characters in a field name. The actions appear in the
/// clause in exactly the order the fields were supplied.
///
/// # Known limitation
///
/// The builder does not deduplicate its input. If the same field is supplied
/// twice it is emitted twice, and DynamoDB rejects the request with an
/// overlapping-paths validation error. Ordered maps such as `serde_json::Map`
/// cannot produce duplicates.
///
/// # Example
///
/// ```
/// use tv_schedule_crud::dynamodb::UpdateExpression;
///
/// let update = UpdateExpression::from_fields([("title", "New title")]).unwrap();
/// assert_eq!(update.expression(), "SET #f0 = :v0");
/// assert_eq!(update.names()["#f0"], "title");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateExpression<V> {
    expression: String,
    names: HashMap<String, String>,
    values: HashMap<String, V>,
}

impl<V> UpdateExpression<V> {
    /// Builds the update clause and its placeholder maps from `(field, value)` pairs.
    pub fn from_fields<I, K>(fields: I) -> Result<Self, UpdateExpressionError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
    {
        let mut actions = Vec::new();
        let mut names = HashMap::new();
        let mut values = HashMap::new();

        for (i, (field, value)) in fields.into_iter().enumerate() {
            let name_placeholder = format!("{NAME_PLACEHOLDER_PREFIX}{i}");
            let value_placeholder = format!("{VALUE_PLACEHOLDER_PREFIX}{i}");

            actions.push(format!("{} = {}", name_placeholder, value_placeholder));
            names.insert(name_placeholder, field.into());
            values.insert(value_placeholder, value);
        }

        if actions.is_empty() {
            return Err(UpdateExpressionError::NoFields);
        }

        Ok(Self {
            expression: format!("SET {}", actions.join(", ")),
            names,
            values,
        })
    }

    /// The `SET ...` clause.
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Placeholder name -> real attribute name.
    pub fn names(&self) -> &HashMap<String, String> {
        &self.names
    }

    /// Placeholder name -> new value.
    pub fn values(&self) -> &HashMap<String, V> {
        &self.values
    }

    /// Number of fields the clause updates.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Converts every value, keeping the clause and the name map as they are.
    pub fn try_map_values<U, E, F>(self, mut convert: F) -> Result<UpdateExpression<U>, E>
    where
        F: FnMut(V) -> Result<U, E>,
    {
        let values = self
            .values
            .into_iter()
            .map(|(placeholder, value)| Ok((placeholder, convert(value)?)))
            .collect::<Result<HashMap<_, _>, E>>()?;

        Ok(UpdateExpression {
            expression: self.expression,
            names: self.names,
            values,
        })
    }

    /// Splits the artifact into the pieces the SDK builder takes.
    pub fn into_parts(self) -> (String, HashMap<String, String>, HashMap<String, V>) {
        (self.expression, self.names, self.values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::{json, Map, Value};
    use std::collections::HashSet;

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected an object, got {other}"),
        }
    }

    fn clause_placeholders(expression: &str) -> Vec<(String, String)> {
        expression
            .strip_prefix("SET ")
            .expect("clause starts with SET")
            .split(", ")
            .map(|action| {
                let (name, value) = action.split_once(" = ").expect("action has '='");
                (name.to_string(), value.to_string())
            })
            .collect()
    }

    #[test]
    fn test_single_field() {
        let update =
            UpdateExpression::from_fields(fields(json!({"title": "Partially Updated Title"})))
                .unwrap();

        assert_eq!(update.expression(), "SET #f0 = :v0");
        assert_eq!(update.names().get("#f0"), Some(&"title".to_string()));
        assert_eq!(
            update.values().get(":v0"),
            Some(&json!("Partially Updated Title"))
        );
        assert_eq!(update.len(), 1);
    }

    #[test]
    fn test_clause_follows_input_order() {
        let input = fields(json!({
            "title": "Evening News",
            "channel": "BBC One",
            "durationMinutes": 30,
            "live": true
        }));
        let update = UpdateExpression::from_fields(input.clone()).unwrap();

        let pairs = clause_placeholders(update.expression());
        let fields_in_clause: Vec<&str> = pairs
            .iter()
            .map(|(name, _)| update.names()[name].as_str())
            .collect();
        let expected: Vec<&str> = input.keys().map(String::as_str).collect();
        assert_eq!(fields_in_clause, expected);
        assert_eq!(
            update.expression(),
            "SET #f0 = :v0, #f1 = :v1, #f2 = :v2, #f3 = :v3"
        );
    }

    #[test]
    fn test_placeholder_maps_match_clause() {
        let input = fields(json!({"a": 1, "b": "two", "c": false, "d": {"nested": [1, 2]}}));
        let update = UpdateExpression::from_fields(input).unwrap();

        let pairs = clause_placeholders(update.expression());
        let clause_names: HashSet<&str> = pairs.iter().map(|(n, _)| n.as_str()).collect();
        let clause_values: HashSet<&str> = pairs.iter().map(|(_, v)| v.as_str()).collect();

        // every placeholder is referenced exactly once
        assert_eq!(clause_names.len(), pairs.len());
        assert_eq!(clause_values.len(), pairs.len());

        let name_keys: HashSet<&str> = update.names().keys().map(String::as_str).collect();
        let value_keys: HashSet<&str> = update.values().keys().map(String::as_str).collect();
        assert_eq!(clause_names, name_keys);
        assert_eq!(clause_values, value_keys);

        // each name placeholder pairs with the value placeholder of the same position
        for (name, value) in &pairs {
            assert_eq!(
                name.trim_start_matches(NAME_PLACEHOLDER_PREFIX),
                value.trim_start_matches(VALUE_PLACEHOLDER_PREFIX)
            );
        }
    }

    #[test]
    fn test_field_names_are_preserved() {
        let input = fields(json!({
            "name": "reserved word",
            "start time": "20:00",
            "meta.rating": "PG",
            "#f1": "looks like a placeholder"
        }));
        let update = UpdateExpression::from_fields(input.clone()).unwrap();

        let recovered: HashSet<&str> = update.names().values().map(String::as_str).collect();
        let expected: HashSet<&str> = input.keys().map(String::as_str).collect();
        assert_eq!(recovered, expected);
        assert_eq!(update.names().len(), input.len());
    }

    #[test]
    fn test_repeat_calls_are_identical() {
        let input = fields(json!({"title": "Match of the Day", "channel": "BBC One"}));
        let first = UpdateExpression::from_fields(input.clone()).unwrap();
        let second = UpdateExpression::from_fields(input).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_input_is_rejected() {
        let result = UpdateExpression::<Value>::from_fields(Map::new());
        assert_eq!(result, Err(UpdateExpressionError::NoFields));
    }

    #[test]
    fn test_try_map_values_keeps_clause() {
        let update = UpdateExpression::from_fields([("durationMinutes", 45), ("episode", 3)])
            .unwrap();
        let expression = update.expression().to_string();
        let names = update.names().clone();

        let mapped = update
            .try_map_values(|n| Ok::<_, ()>(n.to_string()))
            .unwrap();
        assert_eq!(mapped.expression(), expression);
        assert_eq!(mapped.names(), &names);
        assert_eq!(mapped.values().get(":v0"), Some(&"45".to_string()));
        assert_eq!(mapped.values().get(":v1"), Some(&"3".to_string()));
    }

    fn field_value() -> impl Strategy<Value = Value> {
        prop_oneof![
            any::<bool>().prop_map(Value::from),
            any::<i64>().prop_map(Value::from),
            "[A-Za-z0-9 :']{0,16}".prop_map(Value::from),
        ]
    }

    /// Non-empty field mappings whose names include reserved words, spaces,
    /// dots and placeholder-looking text.
    fn field_mapping() -> impl Strategy<Value = Map<String, Value>> {
        let name = prop_oneof![
            "[a-zA-Z][a-zA-Z0-9]{0,10}",
            "[#:.a-z ]{1,8}",
            Just("name".to_string()),
            Just("#f0".to_string()),
            Just(":v0".to_string()),
        ];
        prop::collection::vec((name, field_value()), 1..12)
            .prop_map(|pairs| pairs.into_iter().collect::<Map<String, Value>>())
    }

    proptest! {
        #[test]
        fn property_names_recover_exactly_the_input_keys(input in field_mapping()) {
            let update = UpdateExpression::from_fields(input.clone()).unwrap();

            let recovered: HashSet<&str> = update.names().values().map(String::as_str).collect();
            let expected: HashSet<&str> = input.keys().map(String::as_str).collect();
            prop_assert_eq!(recovered, expected);
            prop_assert_eq!(update.names().len(), input.len());
            prop_assert_eq!(update.values().len(), input.len());
        }

        #[test]
        fn property_each_placeholder_appears_exactly_once(input in field_mapping()) {
            let update = UpdateExpression::from_fields(input.clone()).unwrap();
            let pairs = clause_placeholders(update.expression());
            prop_assert_eq!(pairs.len(), input.len());

            let clause_names: HashSet<&str> = pairs.iter().map(|(n, _)| n.as_str()).collect();
            let clause_values: HashSet<&str> = pairs.iter().map(|(_, v)| v.as_str()).collect();
            prop_assert_eq!(clause_names.len(), pairs.len());
            prop_assert_eq!(clause_values.len(), pairs.len());

            let name_keys: HashSet<&str> = update.names().keys().map(String::as_str).collect();
            let value_keys: HashSet<&str> = update.values().keys().map(String::as_str).collect();
            prop_assert_eq!(clause_names, name_keys);
            prop_assert_eq!(clause_values, value_keys);
        }

        #[test]
        fn property_clause_follows_input_order(input in field_mapping()) {
            let update = UpdateExpression::from_fields(input.clone()).unwrap();

            let pairs = clause_placeholders(update.expression());
            let assigned: Vec<(&str, &Value)> = pairs
                .iter()
                .map(|(name, value)| (update.names()[name].as_str(), &update.values()[value]))
                .collect();
            let expected: Vec<(&str, &Value)> =
                input.iter().map(|(key, value)| (key.as_str(), value)).collect();
            prop_assert_eq!(assigned, expected);
        }

        #[test]
        fn property_repeat_calls_are_identical(input in field_mapping()) {
            let first = UpdateExpression::from_fields(input.clone()).unwrap();
            let second = UpdateExpression::from_fields(input).unwrap();
            prop_assert_eq!(first, second);
        }
    }
}
