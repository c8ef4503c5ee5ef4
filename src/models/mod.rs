pub mod instrument;
pub mod loaders;
pub mod locator;
pub mod record;

pub use instrument::{normalize_identifier, InputRow, WorkItem};
pub use loaders::load_locator_table;
pub use locator::{AggregateDef, CellFormat, ColumnDef, Locator, LocatorTable, NavigationLocators, SectionDef, Strategy};
pub use record::{RecordStatus, SectionRecord};
