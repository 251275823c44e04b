pub mod normalize;
pub mod entry;
pub mod derive;
pub mod category;
pub mod correlation;
pub mod report;
pub mod timeline;
pub mod store;
