//! Step 5: what data is collected and how participants are grouped.

use crate::context::WizardContext;
use finer_core::data_collection::find_data_type;
use finer_core::document::Grouping;
use finer_core::{FinerError, Result, WizardStep};
use indexmap::IndexSet;

pub struct DataCollectionStep<'a> {
    ctx: &'a WizardContext,
}

impl<'a> DataCollectionStep<'a> {
    pub(crate) fn new(ctx: &'a WizardContext) -> Self {
        Self { ctx }
    }

    /// Replaces the selected data types. Unknown ids are rejected.
    pub fn set_types<I, S>(&self, types: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut selected = IndexSet::new();
        for id in types {
            let id = id.as_ref().trim();
            if find_data_type(id).is_none() {
                return Err(FinerError::invalid_value(
                    "dataCollection.types",
                    format!("unknown data type '{}'", id),
                ));
            }
            selected.insert(id.to_string());
        }
        self.ctx
            .store()
            .mutate("dataCollection.types", |doc| doc.data_collection.types = selected)
    }

    /// Adds or removes one data type. Returns whether it is now selected.
    pub fn toggle_type(&self, id: &str) -> Result<bool> {
        let id = id.trim();
        if find_data_type(id).is_none() {
            return Err(FinerError::invalid_value(
                "dataCollection.types",
                format!("unknown data type '{}'", id),
            ));
        }
        let selected = self
            .ctx
            .store()
            .read(|doc| !doc.data_collection.types.contains(id));
        self.ctx.store().mutate("dataCollection.types", |doc| {
            if selected {
                doc.data_collection.types.insert(id.to_string());
            } else {
                doc.data_collection.types.shift_remove(id);
            }
        })?;
        Ok(selected)
    }

    pub fn set_type_other_text(&self, text: &str) -> Result<()> {
        let text = text.trim().to_string();
        self.ctx
            .store()
            .mutate("dataCollection.typeOtherText", |doc| {
                doc.data_collection.type_other_text = text;
            })
    }

    pub fn set_sample_size(&self, sample_size: &str) -> Result<()> {
        let sample_size = sample_size.trim().to_string();
        self.ctx.store().mutate("dataCollection.sampleSize", |doc| {
            doc.data_collection.sample_size = sample_size;
        })
    }

    pub fn set_grouping(&self, grouping: Grouping) -> Result<()> {
        self.ctx.store().mutate("dataCollection.grouping", |doc| {
            doc.data_collection.grouping = Some(grouping);
        })
    }

    pub fn set_grouping_other_text(&self, text: &str) -> Result<()> {
        let text = text.trim().to_string();
        self.ctx
            .store()
            .mutate("dataCollection.groupingOtherText", |doc| {
                doc.data_collection.grouping_other_text = text;
            })
    }

    /// At least one data type and a grouping.
    pub fn is_valid(&self) -> bool {
        self.ctx
            .store()
            .read(|doc| WizardStep::DataCollection.is_complete(doc))
    }
}
