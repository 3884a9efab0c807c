//! Production sheet form.
//!
//! Nested groups are stored as JSON columns with the camelCase keys the
//! sheet has always written; header columns are snake_case.

use serde::{Deserialize, Serialize};

use crate::error::EditError;
use crate::fields::text_fields;
use crate::forms::{append_row, remove_row, row_mut};
use crate::key::digits_only;
use crate::schema::{FormKind, FormSchema, TableSpec, UniqueColumn};
use crate::serde_util::null_as_default;
use crate::validation::{Rules, ValidationFailure, is_blank};

const INSPECTION_QUESTIONS: [&str; 3] = [
    "Is there any off smell of phenol ?",
    "Is there presence of yeasts and moulds CCP?",
    "Is there presence of foreign contaminants?",
];

const CONTROL_VERIFICATIONS: [&str; 10] = [
    "Raw Material visual/sensory inspection",
    "Primary packaging",
    "Secondary packaging",
    "Finished product general aspect",
    "Stamping of batch date on label",
    "Finished product label",
    "Barcode testing",
    "Has previous label been removed from production?",
    "Has country of origin been placed?",
    "Tamper proof sealing if applicable",
];

const DEFAULT_PRODUCTION_STEPS: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawMaterial {
    pub material: String,
    pub supplier: String,
    pub po_number: String,
    pub delivery_date: String,
    pub quantity: String,
}

text_fields! {
    pub enum RawMaterialField for RawMaterial {
        Material => material: "Material",
        Supplier => supplier: "Supplier",
        PoNumber => po_number: "PO Number",
        DeliveryDate => delivery_date: "Delivery Date",
        Quantity => quantity: "Quantity",
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProcessSteps {
    pub date: String,
    pub time: String,
    pub outflow_from_stock: String,
    pub weigh: String,
    pub mixing: String,
    pub storekeeper: String,
}

text_fields! {
    pub enum ProcessStepField for ProcessSteps {
        Date => date: "Process Step Date",
        Time => time: "Process Step Time",
        OutflowFromStock => outflow_from_stock: "Outflow From Stock",
        Weigh => weigh: "Weigh",
        Mixing => mixing: "Mixing",
        Storekeeper => storekeeper: "Storekeeper",
    }
}

/// Answer to an inspection question.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Answer {
    #[serde(rename = "YES")]
    Yes,
    #[serde(rename = "NO")]
    No,
    #[default]
    #[serde(rename = "")]
    Unset,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InspectionItem {
    pub question: String,
    #[serde(deserialize_with = "null_as_default")]
    pub answer: Answer,
    pub description: String,
    pub corrective_action: String,
}

text_fields! {
    /// Free-text columns of an inspection item. The question is fixed.
    pub enum InspectionField for InspectionItem {
        Description => description: "Description",
        CorrectiveAction => corrective_action: "Corrective Action",
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Filtering {
    pub has_been_filtered: String,
    pub by_whom: String,
    pub filter_condition: String,
    pub filter_identification: String,
    pub time_started: String,
    pub time_ended: String,
}

text_fields! {
    pub enum FilteringField for Filtering {
        HasBeenFiltered => has_been_filtered: "Has Been Filtered",
        ByWhom => by_whom: "By Whom",
        FilterCondition => filter_condition: "Filter Condition",
        FilterIdentification => filter_identification: "Filter Identification",
        TimeStarted => time_started: "Filtering Time Started",
        TimeEnded => time_ended: "Filtering Time Ended",
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Sieving {
    pub sieve_condition: String,
    pub sieve_identification: String,
    pub time_started: String,
    pub time_ended: String,
}

text_fields! {
    pub enum SievingField for Sieving {
        SieveCondition => sieve_condition: "Sieve Condition",
        SieveIdentification => sieve_identification: "Sieve Identification",
        TimeStarted => time_started: "Sieving Time Started",
        TimeEnded => time_ended: "Sieving Time Ended",
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BottleClosure {
    pub time_closure_started: String,
    pub time_closure_ended: String,
    pub time_check_started: String,
    pub time_check_ended: String,
    pub checked_by: String,
}

text_fields! {
    pub enum BottleClosureField for BottleClosure {
        TimeClosureStarted => time_closure_started: "Closure Time Started",
        TimeClosureEnded => time_closure_ended: "Closure Time Ended",
        TimeCheckStarted => time_check_started: "Check Time Started",
        TimeCheckEnded => time_check_ended: "Check Time Ended",
        CheckedBy => checked_by: "Checked By",
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProductionStep {
    pub person_performing: String,
    pub packaging_check: String,
    pub pod_placement: String,
    pub extract_filled: String,
    pub product_level: String,
    pub bottles_rinsed: String,
    pub label_stamped: String,
    pub proof_seal: String,
    pub product_labeled: String,
    pub carton_placement: String,
    pub shrink_plastic: String,
}

text_fields! {
    pub enum ProductionStepField for ProductionStep {
        PersonPerforming => person_performing: "Person Performing",
        PackagingCheck => packaging_check: "Packaging Check",
        PodPlacement => pod_placement: "Pod Placement",
        ExtractFilled => extract_filled: "Extract Filled",
        ProductLevel => product_level: "Product Level",
        BottlesRinsed => bottles_rinsed: "Bottles Rinsed",
        LabelStamped => label_stamped: "Label Stamped",
        ProofSeal => proof_seal: "Proof Seal",
        ProductLabeled => product_labeled: "Product Labeled",
        CartonPlacement => carton_placement: "Carton Placement",
        ShrinkPlastic => shrink_plastic: "Shrink Plastic",
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ControlItem {
    pub verification: String,
    pub conform: bool,
    pub non_conform: bool,
    pub description: String,
}

/// The two mutually exclusive marks of a control item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlMark {
    Conform,
    NonConform,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GlassBreakage {
    pub occurred: bool,
    pub quantity: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetRecord {
    #[serde(deserialize_with = "null_as_default")]
    pub product_release_order: String,
    #[serde(deserialize_with = "null_as_default")]
    pub product_reference: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description_of_product: String,
    #[serde(deserialize_with = "null_as_default")]
    pub lot_number: String,
    #[serde(deserialize_with = "null_as_default")]
    pub date: String,
    #[serde(deserialize_with = "null_as_default")]
    pub quantity_produced: String,
    #[serde(deserialize_with = "null_as_default")]
    pub filled_by: String,
    #[serde(deserialize_with = "null_as_default")]
    pub filled_date: String,
    #[serde(deserialize_with = "null_as_default")]
    pub approved_by: String,
    #[serde(deserialize_with = "null_as_default")]
    pub approved_date: String,
    pub raw_materials: Vec<RawMaterial>,
    pub process_steps: ProcessSteps,
    pub inspection_items: Vec<InspectionItem>,
    pub filtering: Filtering,
    pub sieving: Sieving,
    pub bottle_closure: BottleClosure,
    pub production_steps: Vec<ProductionStep>,
    pub control_items: Vec<ControlItem>,
    pub glass_breakage: GlassBreakage,
}

impl Default for SheetRecord {
    fn default() -> Self {
        Self {
            product_release_order: String::new(),
            product_reference: String::new(),
            description_of_product: String::new(),
            lot_number: String::new(),
            date: String::new(),
            quantity_produced: String::new(),
            filled_by: String::new(),
            filled_date: String::new(),
            approved_by: String::new(),
            approved_date: String::new(),
            raw_materials: vec![RawMaterial::default()],
            process_steps: ProcessSteps::default(),
            inspection_items: INSPECTION_QUESTIONS
                .iter()
                .map(|q| InspectionItem {
                    question: (*q).to_string(),
                    ..InspectionItem::default()
                })
                .collect(),
            filtering: Filtering::default(),
            sieving: Sieving::default(),
            bottle_closure: BottleClosure::default(),
            production_steps: vec![ProductionStep::default(); DEFAULT_PRODUCTION_STEPS],
            control_items: CONTROL_VERIFICATIONS
                .iter()
                .map(|v| ControlItem {
                    verification: (*v).to_string(),
                    ..ControlItem::default()
                })
                .collect(),
            glass_breakage: GlassBreakage::default(),
        }
    }
}

text_fields! {
    /// Header and sign-off fields of the production sheet.
    pub enum SheetField for SheetRecord {
        ProductReleaseOrder => product_release_order: "Product Release Order",
        ProductReference => product_reference: "Product Reference",
        DescriptionOfProduct => description_of_product: "Description of Product",
        LotNumber => lot_number: "Lot Number",
        Date => date: "Date",
        QuantityProduced => quantity_produced: "Quantity Produced",
        FilledBy => filled_by: "Filled By",
        FilledDate => filled_date: "Filled Date",
        ApprovedBy => approved_by: "Approved By",
        ApprovedDate => approved_date: "Approved Date",
    }
}

/// A single change to a production sheet.
#[derive(Debug, Clone, PartialEq)]
pub enum SheetEdit {
    Field(SheetField, String),
    RawMaterial {
        row: usize,
        field: RawMaterialField,
        value: String,
    },
    AddRawMaterial,
    RemoveRawMaterial(usize),
    ProcessStep(ProcessStepField, String),
    InspectionAnswer {
        row: usize,
        answer: Answer,
    },
    Inspection {
        row: usize,
        field: InspectionField,
        value: String,
    },
    Filtering(FilteringField, String),
    Sieving(SievingField, String),
    BottleClosure(BottleClosureField, String),
    ProductionStep {
        row: usize,
        field: ProductionStepField,
        value: String,
    },
    AddProductionStep,
    RemoveProductionStep(usize),
    /// Checking one mark clears the other.
    ControlCheck {
        row: usize,
        mark: ControlMark,
        checked: bool,
    },
    ControlDescription {
        row: usize,
        value: String,
    },
    /// Clearing the flag also clears the quantity.
    GlassBreakageOccurred(bool),
    GlassBreakageQuantity(String),
}

fn raw_material_complete(row: &RawMaterial) -> bool {
    RawMaterialField::ALL.iter().all(|f| !is_blank(f.get(row)))
}

fn production_step_complete(row: &ProductionStep) -> bool {
    ProductionStepField::ALL.iter().all(|f| !is_blank(f.get(row)))
}

fn normalize_record(mut record: SheetRecord) -> SheetRecord {
    for field in [SheetField::ProductReleaseOrder, SheetField::QuantityProduced] {
        let value = digits_only(field.get(&record));
        *field.get_mut(&mut record) = value;
    }
    record
}

fn apply_edit(record: &mut SheetRecord, edit: SheetEdit) -> Result<(), EditError> {
    match edit {
        SheetEdit::Field(field @ (SheetField::ProductReleaseOrder | SheetField::QuantityProduced), value) => {
            *field.get_mut(record) = digits_only(&value);
        }
        SheetEdit::Field(field, value) => *field.get_mut(record) = value,
        SheetEdit::RawMaterial { row, field, value } => {
            *field.get_mut(row_mut(&mut record.raw_materials, "raw_materials", row)?) = value;
        }
        SheetEdit::AddRawMaterial => append_row(
            &mut record.raw_materials,
            "raw_materials",
            "row",
            raw_material_complete,
        )?,
        SheetEdit::RemoveRawMaterial(row) => {
            remove_row(&mut record.raw_materials, "raw_materials", row)?
        }
        SheetEdit::ProcessStep(field, value) => *field.get_mut(&mut record.process_steps) = value,
        SheetEdit::InspectionAnswer { row, answer } => {
            row_mut(&mut record.inspection_items, "inspection_items", row)?.answer = answer;
        }
        SheetEdit::Inspection { row, field, value } => {
            *field.get_mut(row_mut(&mut record.inspection_items, "inspection_items", row)?) = value;
        }
        SheetEdit::Filtering(field, value) => *field.get_mut(&mut record.filtering) = value,
        SheetEdit::Sieving(field, value) => *field.get_mut(&mut record.sieving) = value,
        SheetEdit::BottleClosure(field, value) => {
            *field.get_mut(&mut record.bottle_closure) = value
        }
        SheetEdit::ProductionStep { row, field, value } => {
            *field.get_mut(row_mut(&mut record.production_steps, "production_steps", row)?) = value;
        }
        SheetEdit::AddProductionStep => append_row(
            &mut record.production_steps,
            "production_steps",
            "production step",
            production_step_complete,
        )?,
        SheetEdit::RemoveProductionStep(row) => {
            remove_row(&mut record.production_steps, "production_steps", row)?
        }
        SheetEdit::ControlCheck { row, mark, checked } => {
            let item = row_mut(&mut record.control_items, "control_items", row)?;
            match mark {
                ControlMark::Conform => {
                    item.conform = checked;
                    if checked {
                        item.non_conform = false;
                    }
                }
                ControlMark::NonConform => {
                    item.non_conform = checked;
                    if checked {
                        item.conform = false;
                    }
                }
            }
        }
        SheetEdit::ControlDescription { row, value } => {
            row_mut(&mut record.control_items, "control_items", row)?.description = value;
        }
        SheetEdit::GlassBreakageOccurred(occurred) => {
            record.glass_breakage.occurred = occurred;
            if !occurred {
                record.glass_breakage.quantity.clear();
            }
        }
        SheetEdit::GlassBreakageQuantity(value) => record.glass_breakage.quantity = value,
    }
    Ok(())
}

fn validate_record(record: &SheetRecord) -> Vec<ValidationFailure> {
    let mut rules = Rules::new();

    for field in [
        SheetField::ProductReleaseOrder,
        SheetField::ProductReference,
        SheetField::DescriptionOfProduct,
        SheetField::LotNumber,
        SheetField::Date,
        SheetField::QuantityProduced,
    ] {
        rules.require(field.name(), field.label(), field.get(record));
    }
    for field in [SheetField::ProductReleaseOrder, SheetField::QuantityProduced] {
        let value = field.get(record);
        rules.normalized_key(field.name(), field.label(), value, &digits_only(value));
    }

    for field in ProcessStepField::ALL {
        rules.require(
            &format!("process_steps.{}", field.name()),
            field.label(),
            field.get(&record.process_steps),
        );
    }

    for (index, item) in record.inspection_items.iter().enumerate() {
        if item.answer == Answer::Unset {
            rules.push(
                format!("inspection_items[{index}].answer"),
                format!("Inspection item {} answer is required", index + 1),
            );
        }
    }

    let has_production_step = record.production_steps.iter().any(|step| {
        !is_blank(&step.person_performing)
            || !is_blank(&step.packaging_check)
            || !is_blank(&step.pod_placement)
    });
    if !has_production_step {
        rules.push("production_steps", "At least one production step is required");
    }

    for (index, item) in record.control_items.iter().enumerate() {
        let field = format!("control_items[{index}]");
        match (item.conform, item.non_conform) {
            (false, false) => rules.push(
                field,
                format!("Control item \"{}\" requires a conformity check", item.verification),
            ),
            (true, true) => rules.push(
                field,
                format!(
                    "Control item \"{}\" cannot be both conform and non-conform",
                    item.verification
                ),
            ),
            _ => {}
        }
    }

    rules.date("date", "Date", &record.date);
    rules.date("filled_date", "Filled Date", &record.filled_date);
    rules.date("approved_date", "Approved Date", &record.approved_date);
    rules.date("process_steps.date", "Process Step Date", &record.process_steps.date);
    rules.time("process_steps.time", "Process Step Time", &record.process_steps.time);

    rules.date_not_before(
        "process_steps.date",
        &record.date,
        &record.process_steps.date,
        "Process step date cannot be before form date",
    );
    rules.date_not_before(
        "filled_date",
        &record.date,
        &record.filled_date,
        "Filled date cannot be before form date",
    );
    rules.date_not_before(
        "approved_date",
        &record.filled_date,
        &record.approved_date,
        "Approved date cannot be before filled date",
    );

    for (field, label, value) in [
        ("filtering.timeStarted", "Filtering start time", &record.filtering.time_started),
        ("filtering.timeEnded", "Filtering end time", &record.filtering.time_ended),
        ("sieving.timeStarted", "Sieving start time", &record.sieving.time_started),
        ("sieving.timeEnded", "Sieving end time", &record.sieving.time_ended),
    ] {
        rules.time(field, label, value);
    }
    rules.time_not_before(
        "filtering.timeEnded",
        &record.filtering.time_started,
        &record.filtering.time_ended,
        "Filtering end time cannot be before start time",
    );
    rules.time_not_before(
        "sieving.timeEnded",
        &record.sieving.time_started,
        &record.sieving.time_ended,
        "Sieving end time cannot be before start time",
    );
    let closure = &record.bottle_closure;
    rules.time_not_before(
        "bottle_closure.timeClosureEnded",
        &closure.time_closure_started,
        &closure.time_closure_ended,
        "Bottle closure end time cannot be before start time",
    );
    rules.time_not_before(
        "bottle_closure.timeCheckEnded",
        &closure.time_check_started,
        &closure.time_check_ended,
        "Bottle check end time cannot be before start time",
    );

    for (index, material) in record.raw_materials.iter().enumerate() {
        rules.numeric(
            format!("raw_materials[{index}].quantity"),
            &format!("Raw material row {} quantity", index + 1),
            &material.quantity,
        );
        rules.date(
            &format!("raw_materials[{index}].deliveryDate"),
            &format!("Raw material row {} delivery date", index + 1),
            &material.delivery_date,
        );
    }

    if record.glass_breakage.occurred {
        rules.require(
            "glass_breakage.quantity",
            "Glass breakage quantity",
            &record.glass_breakage.quantity,
        );
        rules.numeric(
            "glass_breakage.quantity",
            "Glass breakage quantity",
            &record.glass_breakage.quantity,
        );
    }

    rules.finish()
}

/// Schema marker for the production sheet.
#[derive(Debug, Clone, Copy, Default)]
pub struct SheetForm;

impl FormSchema for SheetForm {
    type Record = SheetRecord;
    type Edit = SheetEdit;

    const KIND: FormKind = FormKind::Sheet;
    const TABLE: TableSpec = TableSpec {
        name: "production_sheets",
        key_column: "product_release_order",
        unique_columns: &[UniqueColumn {
            column: "product_release_order",
            label: "Product Release Order",
        }],
    };
    const KEY_LABEL: &'static str = "Product Release Order";
    const NUMERIC_KEY: bool = true;

    fn initialize() -> SheetRecord {
        SheetRecord::default()
    }

    fn business_key(record: &SheetRecord) -> &str {
        &record.product_release_order
    }

    fn normalize(record: SheetRecord) -> SheetRecord {
        normalize_record(record)
    }

    fn apply(record: &SheetRecord, edit: SheetEdit) -> Result<SheetRecord, EditError> {
        let mut next = record.clone();
        apply_edit(&mut next, edit)?;
        Ok(normalize_record(next))
    }

    fn validate(record: &SheetRecord) -> Vec<ValidationFailure> {
        validate_record(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::has_message;

    fn apply_all(record: SheetRecord, edits: Vec<SheetEdit>) -> SheetRecord {
        edits
            .into_iter()
            .fold(record, |r, e| SheetForm::apply(&r, e).unwrap())
    }

    fn complete_sheet() -> SheetRecord {
        let mut record = SheetRecord {
            product_release_order: "2001".into(),
            product_reference: "VX-10".into(),
            description_of_product: "Vanilla extract 100ml".into(),
            lot_number: "L-2001".into(),
            date: "2024-06-01".into(),
            quantity_produced: "500".into(),
            process_steps: ProcessSteps {
                date: "2024-06-01".into(),
                time: "08:00".into(),
                outflow_from_stock: "20kg".into(),
                weigh: "20kg".into(),
                mixing: "ok".into(),
                storekeeper: "Jo".into(),
            },
            ..SheetRecord::default()
        };
        for item in &mut record.inspection_items {
            item.answer = Answer::No;
        }
        for item in &mut record.control_items {
            item.conform = true;
        }
        record.production_steps[0].person_performing = "Sam".into();
        record
    }

    #[test]
    fn test_defaults() {
        let record = SheetForm::initialize();
        assert_eq!(record.raw_materials.len(), 1);
        assert_eq!(record.inspection_items.len(), 3);
        assert_eq!(record.production_steps.len(), 5);
        assert_eq!(record.control_items.len(), 10);
        assert_eq!(record.control_items[6].verification, "Barcode testing");
        assert!(!record.glass_breakage.occurred);
    }

    #[test]
    fn test_empty_lot_number_is_reported() {
        let mut record = complete_sheet();
        assert!(SheetForm::validate(&record).is_empty());
        record.lot_number.clear();
        let failures = SheetForm::validate(&record);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].message, "Lot Number is required");
    }

    #[test]
    fn test_default_sheet_failures() {
        let failures = SheetForm::validate(&SheetRecord::default());
        for message in [
            "Product Release Order is required",
            "Quantity Produced is required",
            "Process Step Time is required",
            "Storekeeper is required",
            "Inspection item 3 answer is required",
            "At least one production step is required",
            "Control item \"Barcode testing\" requires a conformity check",
        ] {
            assert!(has_message(&failures, message), "missing {message}");
        }
    }

    #[test]
    fn test_control_marks_are_exclusive() {
        let record = apply_all(
            SheetRecord::default(),
            vec![
                SheetEdit::ControlCheck {
                    row: 0,
                    mark: ControlMark::Conform,
                    checked: true,
                },
                SheetEdit::ControlCheck {
                    row: 0,
                    mark: ControlMark::NonConform,
                    checked: true,
                },
            ],
        );
        assert!(!record.control_items[0].conform);
        assert!(record.control_items[0].non_conform);

        let mut stored = complete_sheet();
        stored.control_items[1].non_conform = true;
        let failures = SheetForm::validate(&stored);
        assert!(has_message(
            &failures,
            "Control item \"Primary packaging\" cannot be both conform and non-conform"
        ));
    }

    #[test]
    fn test_raw_material_rows() {
        let record = SheetRecord::default();
        let err = SheetForm::apply(&record, SheetEdit::AddRawMaterial).unwrap_err();
        assert!(matches!(err, EditError::IncompleteRow { .. }));

        let filled = apply_all(
            record,
            RawMaterialField::ALL
                .iter()
                .map(|&field| SheetEdit::RawMaterial {
                    row: 0,
                    field,
                    value: "1".into(),
                })
                .collect(),
        );
        let grown = SheetForm::apply(&filled, SheetEdit::AddRawMaterial).unwrap();
        assert_eq!(grown.raw_materials.len(), 2);
        assert_eq!(grown.raw_materials[1], RawMaterial::default());

        let shrunk = SheetForm::apply(&grown, SheetEdit::RemoveRawMaterial(0)).unwrap();
        assert_eq!(shrunk.raw_materials.len(), 1);
        let err = SheetForm::apply(&shrunk, SheetEdit::RemoveRawMaterial(0)).unwrap_err();
        assert!(matches!(err, EditError::LastRow { .. }));
    }

    #[test]
    fn test_production_step_add_message() {
        let err = SheetForm::apply(&SheetRecord::default(), SheetEdit::AddProductionStep).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Please fill in all fields in the current production step before adding a new one"
        );
    }

    #[test]
    fn test_glass_breakage() {
        let record = apply_all(
            complete_sheet(),
            vec![SheetEdit::GlassBreakageOccurred(true)],
        );
        assert!(has_message(
            &SheetForm::validate(&record),
            "Glass breakage quantity is required"
        ));

        let record = apply_all(record, vec![SheetEdit::GlassBreakageQuantity("2".into())]);
        assert!(SheetForm::validate(&record).is_empty());

        let record = apply_all(record, vec![SheetEdit::GlassBreakageOccurred(false)]);
        assert_eq!(record.glass_breakage.quantity, "");
    }

    #[test]
    fn test_date_and_time_ordering() {
        let mut record = complete_sheet();
        record.process_steps.date = "2024-05-31".into();
        record.filtering.time_started = "10:00".into();
        record.filtering.time_ended = "09:00".into();
        record.sieving.time_started = "11:00".into();
        record.sieving.time_ended = "10:30".into();
        let failures = SheetForm::validate(&record);
        assert!(has_message(&failures, "Process step date cannot be before form date"));
        assert!(has_message(&failures, "Filtering end time cannot be before start time"));
        assert!(has_message(&failures, "Sieving end time cannot be before start time"));
    }

    #[test]
    fn test_numeric_header_fields() {
        let record = apply_all(
            SheetRecord::default(),
            vec![
                SheetEdit::Field(SheetField::ProductReleaseOrder, " 20-01 ".into()),
                SheetEdit::Field(SheetField::QuantityProduced, "500 units".into()),
                SheetEdit::Field(SheetField::LotNumber, "L-20".into()),
            ],
        );
        assert_eq!(record.product_release_order, "2001");
        assert_eq!(record.quantity_produced, "500");
        assert_eq!(record.lot_number, "L-20");
    }

    #[test]
    fn test_row_shape() {
        let row = SheetForm::to_row(&complete_sheet()).unwrap();
        assert_eq!(row["product_release_order"], "2001");
        assert_eq!(row["process_steps"]["outflowFromStock"], "20kg");
        assert_eq!(row["inspection_items"][0]["answer"], "NO");
        assert_eq!(row["control_items"][0]["nonConform"], false);

        let back = SheetForm::from_row(row).unwrap();
        assert_eq!(back, complete_sheet());
    }

    #[test]
    fn test_normalize_keeps_numeric_header_digits_only() {
        let mut record = complete_sheet();
        record.product_release_order = "PRS-2001".into();
        record.quantity_produced = "500 units".into();
        let failures = SheetForm::validate(&record);
        assert!(has_message(
            &failures,
            "Product Release Order must be entered as \"2001\""
        ));
        assert!(has_message(&failures, "Quantity Produced must be entered as \"500\""));

        let normalized = SheetForm::normalize(record);
        assert_eq!(normalized, complete_sheet());
        assert!(SheetForm::validate(&normalized).is_empty());
    }
}
