//! Production release form: eight tolerance-scored sample rows plus the
//! release decision and its sign-off.

use serde::{Deserialize, Deserializer, Serialize};

use crate::derive::complete_average;
use crate::error::EditError;
use crate::fields::text_fields;
use crate::forms::row_mut;
use crate::key::{digits_only, truncate_chars};
use crate::schema::{FormKind, FormSchema, TableSpec, UniqueColumn};
use crate::serde_util::{null_as_default, string_or_number};
use crate::tolerance::{self, Presentation};
use crate::validation::{Rules, ValidationFailure};

/// Maximum length of a production release order.
pub const RELEASE_ORDER_MAX_LEN: usize = 10;

/// One row of the sample table, scored against a tolerance category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleRow {
    #[serde(default, deserialize_with = "string_or_number")]
    pub sample1: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub sample2: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub sample3: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub sample4: String,
    /// Derived from the four slots.
    #[serde(default, deserialize_with = "string_or_number")]
    pub average: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub deviation: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub corrective_action: String,
}

impl SampleRow {
    pub fn slots(&self) -> [&str; 4] {
        [&self.sample1, &self.sample2, &self.sample3, &self.sample4]
    }

    fn recompute_average(&mut self) {
        self.average = complete_average(&self.slots());
    }
}

/// One of the four sample slots of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleSlot {
    One,
    Two,
    Three,
    Four,
}

impl SampleSlot {
    pub const ALL: [SampleSlot; 4] = [Self::One, Self::Two, Self::Three, Self::Four];

    /// 1-based slot number.
    pub fn number(self) -> usize {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
            Self::Four => 4,
        }
    }

    pub fn from_number(number: usize) -> Option<Self> {
        Self::ALL.get(number.checked_sub(1)?).copied()
    }

    pub fn get(self, row: &SampleRow) -> &str {
        match self {
            Self::One => &row.sample1,
            Self::Two => &row.sample2,
            Self::Three => &row.sample3,
            Self::Four => &row.sample4,
        }
    }

    fn get_mut(self, row: &mut SampleRow) -> &mut String {
        match self {
            Self::One => &mut row.sample1,
            Self::Two => &mut row.sample2,
            Self::Three => &mut row.sample3,
            Self::Four => &mut row.sample4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub production_release_order: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub production_date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub evaluation_date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub lot_number: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub product_code: String,
    #[serde(default = "default_samples", deserialize_with = "samples_or_default")]
    pub samples: Vec<SampleRow>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub can_release: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub elaborated_by: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub elaborated_date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub approved_by: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub approved_date: String,
}

fn default_samples() -> Vec<SampleRow> {
    vec![SampleRow::default(); tolerance::category_count()]
}

/// Missing rows are padded so every tolerance category keeps its row.
fn samples_or_default<'de, D>(deserializer: D) -> Result<Vec<SampleRow>, D::Error>
where
    D: Deserializer<'de>,
{
    let mut samples = Option::<Vec<SampleRow>>::deserialize(deserializer)?.unwrap_or_default();
    if samples.len() < tolerance::category_count() {
        samples.resize(tolerance::category_count(), SampleRow::default());
    }
    Ok(samples)
}

impl Default for ReleaseRecord {
    fn default() -> Self {
        Self {
            production_release_order: String::new(),
            production_date: String::new(),
            evaluation_date: String::new(),
            lot_number: String::new(),
            product_code: String::new(),
            samples: default_samples(),
            can_release: false,
            elaborated_by: String::new(),
            elaborated_date: String::new(),
            approved_by: String::new(),
            approved_date: String::new(),
        }
    }
}

impl ReleaseRecord {
    /// How a sample slot is presented against its tolerance category.
    pub fn presentation(&self, row: usize, slot: SampleSlot) -> Presentation {
        self.samples
            .get(row)
            .map(|r| tolerance::lookup(row, slot.get(r)))
            .unwrap_or(Presentation::NEUTRAL)
    }
}

text_fields! {
    /// Header and sign-off fields of the release form.
    pub enum ReleaseField for ReleaseRecord {
        ProductionReleaseOrder => production_release_order: "Production Release Order",
        ProductionDate => production_date: "Production Date",
        EvaluationDate => evaluation_date: "Evaluation Date",
        LotNumber => lot_number: "Lot Number",
        ProductCode => product_code: "Product Code",
        ElaboratedBy => elaborated_by: "Elaborated By",
        ElaboratedDate => elaborated_date: "Elaborated Date",
        ApprovedBy => approved_by: "Approved By",
        ApprovedDate => approved_date: "Approved Date",
    }
}

/// A single change to a release record.
#[derive(Debug, Clone, PartialEq)]
pub enum ReleaseEdit {
    Field(ReleaseField, String),
    /// Free-form value typed into a sample slot.
    Sample {
        row: usize,
        slot: SampleSlot,
        value: String,
    },
    /// Score picked from the row's tolerance table.
    Tolerance {
        row: usize,
        slot: SampleSlot,
        value: i64,
    },
    Deviation {
        row: usize,
        value: String,
    },
    CorrectiveAction {
        row: usize,
        value: String,
    },
    CanRelease(bool),
}

/// Production release orders are digits only, at most ten of them.
fn release_order(value: &str) -> String {
    truncate_chars(digits_only(value), Some(RELEASE_ORDER_MAX_LEN))
}

fn normalize_record(mut record: ReleaseRecord) -> ReleaseRecord {
    record.production_release_order = release_order(&record.production_release_order);
    record.samples.iter_mut().for_each(SampleRow::recompute_average);
    record
}

fn sample_row(record: &mut ReleaseRecord, row: usize) -> Result<&mut SampleRow, EditError> {
    row_mut(&mut record.samples, "samples", row)
}

fn apply_edit(record: &mut ReleaseRecord, edit: ReleaseEdit) -> Result<(), EditError> {
    match edit {
        ReleaseEdit::Field(ReleaseField::ProductionReleaseOrder, value) => {
            record.production_release_order = release_order(&value);
        }
        ReleaseEdit::Field(field, value) => *field.get_mut(record) = value,
        ReleaseEdit::Sample { row, slot, value } => {
            let sample = sample_row(record, row)?;
            *slot.get_mut(sample) = value;
            sample.recompute_average();
        }
        ReleaseEdit::Tolerance { row, slot, value } => {
            let category = tolerance::category(row)
                .ok_or_else(|| EditError::out_of_range("samples", row, tolerance::category_count()))?;
            if category.option(value).is_none() {
                return Err(EditError::UnknownToleranceValue {
                    category: category.name,
                    value,
                });
            }
            let sample = sample_row(record, row)?;
            *slot.get_mut(sample) = value.to_string();
            sample.recompute_average();
        }
        ReleaseEdit::Deviation { row, value } => sample_row(record, row)?.deviation = value,
        ReleaseEdit::CorrectiveAction { row, value } => {
            sample_row(record, row)?.corrective_action = value
        }
        ReleaseEdit::CanRelease(can_release) => record.can_release = can_release,
    }
    Ok(())
}

fn validate_record(record: &ReleaseRecord) -> Vec<ValidationFailure> {
    let mut rules = Rules::new();

    for field in [
        ReleaseField::ProductionReleaseOrder,
        ReleaseField::LotNumber,
        ReleaseField::ProductionDate,
        ReleaseField::EvaluationDate,
    ] {
        rules.require(field.name(), field.label(), field.get(record));
    }
    rules.normalized_key(
        ReleaseField::ProductionReleaseOrder.name(),
        ReleaseField::ProductionReleaseOrder.label(),
        &record.production_release_order,
        &release_order(&record.production_release_order),
    );

    for field in [
        ReleaseField::ProductionDate,
        ReleaseField::EvaluationDate,
        ReleaseField::ElaboratedDate,
        ReleaseField::ApprovedDate,
    ] {
        rules.date(field.name(), field.label(), field.get(record));
    }

    rules.date_not_before(
        "evaluation_date",
        &record.production_date,
        &record.evaluation_date,
        "Evaluation Date cannot be before Production Date",
    );
    rules.date_not_before(
        "elaborated_date",
        &record.evaluation_date,
        &record.elaborated_date,
        "Elaborated Date cannot be before Evaluation Date",
    );
    rules.date_not_before(
        "approved_date",
        &record.elaborated_date,
        &record.approved_date,
        "Approved Date cannot be before Elaborated Date",
    );

    for (index, row) in record.samples.iter().enumerate() {
        let category = tolerance::category(index).map_or("Sample", |c| c.name);
        for slot in SampleSlot::ALL {
            rules.numeric(
                format!("samples[{index}].sample{}", slot.number()),
                &format!("{category}: sample {}", slot.number()),
                slot.get(row),
            );
        }
    }

    rules.finish()
}

/// Schema marker for the production release form.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReleaseForm;

impl FormSchema for ReleaseForm {
    type Record = ReleaseRecord;
    type Edit = ReleaseEdit;

    const KIND: FormKind = FormKind::Release;
    const TABLE: TableSpec = TableSpec {
        name: "production_releases",
        key_column: "production_release_order",
        unique_columns: &[
            UniqueColumn {
                column: "production_release_order",
                label: "Production Release Order",
            },
            UniqueColumn {
                column: "lot_number",
                label: "Lot Number",
            },
        ],
    };
    const KEY_LABEL: &'static str = "Production Release Order";
    const NUMERIC_KEY: bool = true;

    fn initialize() -> ReleaseRecord {
        ReleaseRecord::default()
    }

    fn business_key(record: &ReleaseRecord) -> &str {
        &record.production_release_order
    }

    fn normalize(record: ReleaseRecord) -> ReleaseRecord {
        normalize_record(record)
    }

    fn apply(record: &ReleaseRecord, edit: ReleaseEdit) -> Result<ReleaseRecord, EditError> {
        let mut next = record.clone();
        apply_edit(&mut next, edit)?;
        Ok(normalize_record(next))
    }

    fn validate(record: &ReleaseRecord) -> Vec<ValidationFailure> {
        validate_record(record)
    }
}
