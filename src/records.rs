use serde_json::{Map, Value};

use crate::domain::TargetChemblId;
use crate::error::ExplorerError;

/// Field name to value mapping, in the order the provider sent the fields.
pub type FieldMap = Map<String, Value>;

/// One row of a ChEMBL target search.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetRecord {
    pub target_chembl_id: TargetChemblId,
    pub pref_name: Option<String>,
    pub organism: Option<String>,
    pub target_type: Option<String>,
    pub score: Option<f64>,
    pub fields: FieldMap,
}

impl TargetRecord {
    pub fn from_value(value: Value) -> Result<Self, ExplorerError> {
        let fields = into_object(value, "target")?;
        let target_chembl_id = fields
            .get("target_chembl_id")
            .and_then(|v| v.as_str())
            .ok_or(ExplorerError::MissingField {
                record: "target",
                field: "target_chembl_id",
            })?
            .parse()?;

        Ok(Self {
            target_chembl_id,
            pref_name: string_field(&fields, "pref_name"),
            organism: string_field(&fields, "organism"),
            target_type: string_field(&fields, "target_type"),
            score: fields.get("score").and_then(|v| v.as_f64()),
            fields,
        })
    }

    pub fn id(&self) -> &TargetChemblId {
        &self.target_chembl_id
    }
}

/// One bioactivity measurement. ChEMBL ships numeric measurements as strings,
/// so they are kept verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityRecord {
    pub activity_id: Option<u64>,
    pub molecule_chembl_id: Option<String>,
    pub canonical_smiles: Option<String>,
    pub assay_chembl_id: Option<String>,
    pub standard_type: Option<String>,
    pub standard_relation: Option<String>,
    pub standard_value: Option<String>,
    pub standard_units: Option<String>,
    pub pchembl_value: Option<String>,
    pub fields: FieldMap,
}

impl ActivityRecord {
    pub fn from_value(value: Value) -> Result<Self, ExplorerError> {
        let fields = into_object(value, "activity")?;
        Ok(Self {
            activity_id: fields.get("activity_id").and_then(|v| v.as_u64()),
            molecule_chembl_id: string_field(&fields, "molecule_chembl_id"),
            canonical_smiles: string_field(&fields, "canonical_smiles"),
            assay_chembl_id: string_field(&fields, "assay_chembl_id"),
            standard_type: string_field(&fields, "standard_type"),
            standard_relation: string_field(&fields, "standard_relation"),
            standard_value: scalar_field(&fields, "standard_value"),
            standard_units: string_field(&fields, "standard_units"),
            pchembl_value: scalar_field(&fields, "pchembl_value"),
            fields,
        })
    }
}

fn into_object(value: Value, record: &str) -> Result<FieldMap, ExplorerError> {
    match value {
        Value::Object(fields) => Ok(fields),
        other => Err(ExplorerError::ChemblDecode(format!(
            "{record} record is not a JSON object: {other}"
        ))),
    }
}

fn string_field(fields: &FieldMap, name: &str) -> Option<String> {
    fields
        .get(name)
        .and_then(|v| v.as_str())
        .map(|v| v.to_string())
}

fn scalar_field(fields: &FieldMap, name: &str) -> Option<String> {
    match fields.get(name) {
        Some(Value::String(value)) => Some(value.clone()),
        Some(Value::Number(value)) => Some(value.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    #[test]
    fn target_record_keeps_every_field_in_order() {
        let record = TargetRecord::from_value(json!({
            "target_chembl_id": "CHEMBL203",
            "pref_name": "Epidermal growth factor receptor erbB1",
            "organism": "Homo sapiens",
            "target_type": "SINGLE PROTEIN",
            "score": 16.0,
            "species_group_flag": false
        }))
        .unwrap();

        assert_eq!(record.id().as_str(), "CHEMBL203");
        assert_eq!(record.organism.as_deref(), Some("Homo sapiens"));
        assert_eq!(record.score, Some(16.0));
        let keys: Vec<&str> = record.fields.keys().map(|k| k.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "target_chembl_id",
                "pref_name",
                "organism",
                "target_type",
                "score",
                "species_group_flag"
            ]
        );
    }

    #[test]
    fn target_record_requires_id() {
        let err = TargetRecord::from_value(json!({"pref_name": "EGFR"})).unwrap_err();
        assert_matches!(
            err,
            ExplorerError::MissingField {
                field: "target_chembl_id",
                ..
            }
        );
    }

    #[test]
    fn activity_record_reads_string_and_numeric_values() {
        let record = ActivityRecord::from_value(json!({
            "activity_id": 31863,
            "molecule_chembl_id": "CHEMBL68920",
            "standard_value": "41.0",
            "pchembl_value": 7.39,
            "standard_units": null
        }))
        .unwrap();

        assert_eq!(record.activity_id, Some(31863));
        assert_eq!(record.standard_value.as_deref(), Some("41.0"));
        assert_eq!(record.pchembl_value.as_deref(), Some("7.39"));
        assert_eq!(record.standard_units, None);
        assert_eq!(record.fields.len(), 5);
    }

    #[test]
    fn non_object_record_is_a_decode_error() {
        let err = ActivityRecord::from_value(json!(["CHEMBL68920"])).unwrap_err();
        assert_matches!(err, ExplorerError::ChemblDecode(_));
    }
}
