//! Record model for the quality-control forms.
//!
//! Three record variants (production release, production sheet, volume
//! control) share one shape of logic: typed edits that never touch sibling
//! fields, derived averages, and pure validation. [`FormSchema`] describes
//! each variant to the reconciler.

pub mod derive;
pub mod error;
mod fields;
pub mod forms;
pub mod key;
pub mod schema;
mod serde_util;
pub mod time;
pub mod tolerance;
pub mod validation;

pub use error::{CoreError, EditError, Result};
pub use forms::release::{
    RELEASE_ORDER_MAX_LEN, ReleaseEdit, ReleaseField, ReleaseForm, ReleaseRecord, SampleRow,
    SampleSlot,
};
pub use forms::sheet::{
    Answer, BottleClosure, BottleClosureField, ControlItem, ControlMark, Filtering,
    FilteringField, GlassBreakage, InspectionField, InspectionItem, ProcessStepField,
    ProcessSteps, ProductionStep, ProductionStepField, RawMaterial, RawMaterialField, SheetEdit,
    SheetField, SheetForm, SheetRecord, Sieving, SievingField,
};
pub use forms::volume::{
    Conformity, CylinderField, MeasuringCylinder, VolumeEdit, VolumeField, VolumeForm,
    VolumeRecord, WEIGHTS_PER_ROW, WeightMeasurement,
};
pub use key::{digits_only, normalize_search_key};
pub use schema::{FormKind, FormSchema, TableSpec, UniqueColumn};
pub use tolerance::{Presentation, TOLERANCE_TABLE, ToleranceCategory, ToleranceOption};
pub use validation::{ValidationFailure, has_message};
