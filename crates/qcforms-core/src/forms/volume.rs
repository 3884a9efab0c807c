//! Volume control form: measuring cylinder calibration and fill-weight
//! sampling.

use serde::{Deserialize, Deserializer, Serialize};

use crate::derive::{filled_average, is_non_numeric};
use crate::error::EditError;
use crate::fields::text_fields;
use crate::forms::row_mut;
use crate::schema::{FormKind, FormSchema, TableSpec, UniqueColumn};
use crate::serde_util::null_as_default;
use crate::validation::{Rules, ValidationFailure, is_blank};

/// Weight slots per measurement row.
pub const WEIGHTS_PER_ROW: usize = 6;
/// Measurement rows on a blank form.
pub const WEIGHT_ROWS: usize = 15;

const CYLINDERS: [(&str, &str); 3] = [
    ("PYREX CYLINDER", "100ML ± 1ML"),
    ("EX 20 ML CYLINDER", "250ML ± 2ML"),
    ("LASANY 1000ML CYLINDER", "1000ML ± 2ML"),
];

/// Yes/No selection shared by cylinders and weight rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Conformity {
    Yes,
    No,
    #[default]
    #[serde(rename = "")]
    Unset,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MeasuringCylinder {
    #[serde(rename = "type")]
    pub kind: String,
    pub ml100: String,
    pub ml250: String,
    pub ml1000: String,
    /// Fixed per cylinder.
    pub max_permissible_error: String,
    #[serde(deserialize_with = "null_as_default")]
    pub conforming: Conformity,
}

impl MeasuringCylinder {
    fn has_any_data(&self) -> bool {
        CylinderField::ALL.iter().any(|f| !is_blank(f.get(self)))
            || self.conforming != Conformity::Unset
    }
}

text_fields! {
    /// Measured volumes of a cylinder.
    pub enum CylinderField for MeasuringCylinder {
        Ml100 => ml100: "100ML measurement",
        Ml250 => ml250: "250ML measurement",
        Ml1000 => ml1000: "1000ML measurement",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WeightMeasurement {
    pub time: String,
    #[serde(deserialize_with = "weights_or_default")]
    pub weights: Vec<String>,
    /// Derived from the filled weights.
    pub average: String,
    #[serde(deserialize_with = "null_as_default")]
    pub conforming: Conformity,
}

impl Default for WeightMeasurement {
    fn default() -> Self {
        Self {
            time: String::new(),
            weights: vec![String::new(); WEIGHTS_PER_ROW],
            average: String::new(),
            conforming: Conformity::Unset,
        }
    }
}

impl WeightMeasurement {
    fn filled_weights(&self) -> usize {
        self.weights.iter().filter(|w| !is_blank(w)).count()
    }

    fn has_any_data(&self) -> bool {
        !is_blank(&self.time) || self.filled_weights() > 0 || self.conforming != Conformity::Unset
    }
}

fn weights_or_default<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let mut weights = Option::<Vec<Option<String>>>::deserialize(deserializer)?
        .unwrap_or_default()
        .into_iter()
        .map(Option::unwrap_or_default)
        .collect::<Vec<_>>();
    if weights.len() < WEIGHTS_PER_ROW {
        weights.resize(WEIGHTS_PER_ROW, String::new());
    }
    Ok(weights)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeRecord {
    #[serde(deserialize_with = "null_as_default")]
    pub product_release_order: String,
    #[serde(deserialize_with = "null_as_default")]
    pub date: String,
    #[serde(deserialize_with = "null_as_default")]
    pub product_reference: String,
    #[serde(deserialize_with = "null_as_default")]
    pub quantity_produced: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description_of_product: String,
    #[serde(deserialize_with = "null_as_default")]
    pub lot_number: String,
    #[serde(deserialize_with = "null_as_default")]
    pub client: String,
    #[serde(deserialize_with = "null_as_default")]
    pub alcohol_content: String,
    #[serde(deserialize_with = "null_as_default")]
    pub acceptable_weight_range: String,
    pub measuring_cylinders: Vec<MeasuringCylinder>,
    #[serde(deserialize_with = "null_as_default")]
    pub cylinder_non_conforming: bool,
    pub weight_measurements: Vec<WeightMeasurement>,
    #[serde(deserialize_with = "null_as_default")]
    pub checked_by: String,
    #[serde(deserialize_with = "null_as_default")]
    pub checked_date: String,
    #[serde(deserialize_with = "null_as_default")]
    pub verified_by: String,
    #[serde(deserialize_with = "null_as_default")]
    pub verified_date: String,
}

impl Default for VolumeRecord {
    fn default() -> Self {
        Self {
            product_release_order: String::new(),
            date: String::new(),
            product_reference: String::new(),
            quantity_produced: String::new(),
            description_of_product: String::new(),
            lot_number: String::new(),
            client: String::new(),
            alcohol_content: String::new(),
            acceptable_weight_range: String::new(),
            measuring_cylinders: CYLINDERS
                .iter()
                .map(|(kind, error)| MeasuringCylinder {
                    kind: (*kind).to_string(),
                    max_permissible_error: (*error).to_string(),
                    ..MeasuringCylinder::default()
                })
                .collect(),
            cylinder_non_conforming: false,
            weight_measurements: vec![WeightMeasurement::default(); WEIGHT_ROWS],
            checked_by: String::new(),
            checked_date: String::new(),
            verified_by: String::new(),
            verified_date: String::new(),
        }
    }
}

text_fields! {
    pub enum VolumeField for VolumeRecord {
        ProductReleaseOrder => product_release_order: "Product Release Order",
        Date => date: "Date",
        ProductReference => product_reference: "Product Reference",
        QuantityProduced => quantity_produced: "Quantity Produced",
        DescriptionOfProduct => description_of_product: "Description of Product",
        LotNumber => lot_number: "Lot Number",
        Client => client: "Client",
        AlcoholContent => alcohol_content: "Alcohol Content",
        AcceptableWeightRange => acceptable_weight_range: "Acceptable Weight Range",
        CheckedBy => checked_by: "Checked By",
        CheckedDate => checked_date: "Checked Date",
        VerifiedBy => verified_by: "Verified By",
        VerifiedDate => verified_date: "Verified Date",
    }
}

/// Header fields that must always be filled.
const REQUIRED_FIELDS: [VolumeField; 9] = [
    VolumeField::ProductReleaseOrder,
    VolumeField::Date,
    VolumeField::ProductReference,
    VolumeField::QuantityProduced,
    VolumeField::DescriptionOfProduct,
    VolumeField::LotNumber,
    VolumeField::Client,
    VolumeField::AlcoholContent,
    VolumeField::AcceptableWeightRange,
];

/// A single change to a volume control record.
#[derive(Debug, Clone, PartialEq)]
pub enum VolumeEdit {
    Field(VolumeField, String),
    Cylinder {
        row: usize,
        field: CylinderField,
        value: String,
    },
    CylinderConforming {
        row: usize,
        conforming: Conformity,
    },
    CylinderNonConforming(bool),
    WeightTime {
        row: usize,
        value: String,
    },
    /// Sets one of the six weights and recomputes the row average.
    Weight {
        row: usize,
        slot: usize,
        value: String,
    },
    WeightConforming {
        row: usize,
        conforming: Conformity,
    },
}

fn normalize_record(mut record: VolumeRecord) -> VolumeRecord {
    record.product_release_order = record.product_release_order.trim().to_string();
    for measurement in &mut record.weight_measurements {
        measurement.average = filled_average(&measurement.weights);
    }
    record
}

fn apply_edit(record: &mut VolumeRecord, edit: VolumeEdit) -> Result<(), EditError> {
    match edit {
        VolumeEdit::Field(field, value) => *field.get_mut(record) = value,
        VolumeEdit::Cylinder { row, field, value } => {
            *field.get_mut(row_mut(&mut record.measuring_cylinders, "measuring_cylinders", row)?) =
                value;
        }
        VolumeEdit::CylinderConforming { row, conforming } => {
            row_mut(&mut record.measuring_cylinders, "measuring_cylinders", row)?.conforming =
                conforming;
        }
        VolumeEdit::CylinderNonConforming(flag) => record.cylinder_non_conforming = flag,
        VolumeEdit::WeightTime { row, value } => {
            row_mut(&mut record.weight_measurements, "weight_measurements", row)?.time = value;
        }
        VolumeEdit::Weight { row, slot, value } => {
            let measurement = row_mut(&mut record.weight_measurements, "weight_measurements", row)?;
            *row_mut(&mut measurement.weights, "weights", slot)? = value;
            measurement.average = filled_average(&measurement.weights);
        }
        VolumeEdit::WeightConforming { row, conforming } => {
            row_mut(&mut record.weight_measurements, "weight_measurements", row)?.conforming =
                conforming;
        }
    }
    Ok(())
}

fn validate_record(record: &VolumeRecord) -> Vec<ValidationFailure> {
    let mut rules = Rules::new();

    for field in REQUIRED_FIELDS {
        rules.require(field.name(), field.label(), field.get(record));
    }
    rules.normalized_key(
        VolumeField::ProductReleaseOrder.name(),
        VolumeField::ProductReleaseOrder.label(),
        &record.product_release_order,
        record.product_release_order.trim(),
    );

    for (index, cylinder) in record.measuring_cylinders.iter().enumerate() {
        if !cylinder.has_any_data() {
            continue;
        }
        for field in CylinderField::ALL {
            if is_blank(field.get(cylinder)) {
                rules.push(
                    format!("measuring_cylinders[{index}].{}", field.name()),
                    format!("{}: {} is required", cylinder.kind, field.label()),
                );
            }
        }
        if cylinder.conforming == Conformity::Unset {
            rules.push(
                format!("measuring_cylinders[{index}].conforming"),
                format!("{}: Conformity check is required", cylinder.kind),
            );
        }
    }

    for (index, measurement) in record.weight_measurements.iter().enumerate() {
        if !measurement.has_any_data() {
            continue;
        }
        let row = index + 1;
        let field = format!("weight_measurements[{index}]");
        if is_blank(&measurement.time) {
            rules.push(
                format!("{field}.time"),
                format!("Weight measurement row {row}: Time is required"),
            );
        }
        if measurement.filled_weights() < WEIGHTS_PER_ROW {
            rules.push(
                format!("{field}.weights"),
                format!("Weight measurement row {row}: All weight values must be filled"),
            );
        }
        if measurement.conforming == Conformity::Unset {
            rules.push(
                format!("{field}.conforming"),
                format!("Weight measurement row {row}: Conformity check is required"),
            );
        }
        for (slot, weight) in measurement.weights.iter().enumerate() {
            if is_non_numeric(weight) {
                rules.push(
                    format!("{field}.weights[{slot}]"),
                    format!(
                        "Weight measurement row {row}, weight {}: Must be a valid number",
                        slot + 1
                    ),
                );
            }
        }
        rules.time(
            &format!("{field}.time"),
            &format!("Weight measurement row {row}: Time"),
            &measurement.time,
        );
    }

    rules.pair(
        ("checked_by", record.checked_by.as_str(), "Checked by name is required"),
        ("checked_date", record.checked_date.as_str(), "Checked date is required"),
    );
    rules.pair(
        ("verified_by", record.verified_by.as_str(), "Verified by name is required"),
        ("verified_date", record.verified_date.as_str(), "Verified date is required"),
    );

    for field in [VolumeField::Date, VolumeField::CheckedDate, VolumeField::VerifiedDate] {
        rules.date(field.name(), field.label(), field.get(record));
    }
    rules.date_not_before(
        "checked_date",
        &record.date,
        &record.checked_date,
        "Checked date cannot be before form date",
    );
    rules.date_not_before(
        "verified_date",
        &record.checked_date,
        &record.verified_date,
        "Verified date cannot be before checked date",
    );

    rules.finish()
}

/// Schema marker for the volume control form.
#[derive(Debug, Clone, Copy, Default)]
pub struct VolumeForm;

impl FormSchema for VolumeForm {
    type Record = VolumeRecord;
    type Edit = VolumeEdit;

    const KIND: FormKind = FormKind::Volume;
    const TABLE: TableSpec = TableSpec {
        name: "volume_controls",
        key_column: "product_release_order",
        unique_columns: &[
            UniqueColumn {
                column: "product_release_order",
                label: "Product Release Order",
            },
            UniqueColumn {
                column: "lot_number",
                label: "Lot Number",
            },
        ],
    };
    const KEY_LABEL: &'static str = "Product Release Order";
    const NUMERIC_KEY: bool = false;

    fn initialize() -> VolumeRecord {
        VolumeRecord::default()
    }

    fn business_key(record: &VolumeRecord) -> &str {
        &record.product_release_order
    }

    fn normalize(record: VolumeRecord) -> VolumeRecord {
        normalize_record(record)
    }

    fn apply(record: &VolumeRecord, edit: VolumeEdit) -> Result<VolumeRecord, EditError> {
        let mut next = record.clone();
        apply_edit(&mut next, edit)?;
        Ok(normalize_record(next))
    }

    fn validate(record: &VolumeRecord) -> Vec<ValidationFailure> {
        validate_record(record)
    }
}
