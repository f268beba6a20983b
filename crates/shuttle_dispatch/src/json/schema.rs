use schemars::schema_for;

use crate::json::types;

pub fn generate_json_schema() -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&schema_for!(types::JsonDispatchSnapshot))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_describes_snapshot() {
        let schema = generate_json_schema().unwrap();

        assert!(schema.contains("\"DispatchSnapshot\""));
        assert!(schema.contains("travel_times"));
        assert!(schema.contains("latest_arrival_time"));
    }
}
