//! Tag templates and the tag instances that point at them.

use machinemind_foundation::{EntryType, RawRecord, Result, Value};
use machinemind_registry::{Live, Loader, OpCtx, RegEntry, Registry};

/// A tag definition, e.g. "Heat {VAL} (Self)".
#[derive(Debug, Default)]
pub struct TagTemplate {
    /// Semantic id (`tg_heat_self`).
    pub id: String,
    /// Display name, possibly with a `{VAL}` placeholder.
    pub name: String,
    /// Rules text.
    pub description: String,
    /// Hidden from item listings.
    pub hidden: bool,
    /// Ignored by item filters.
    pub filter_ignore: bool,
}

impl TagTemplate {
    /// Creates a tag template from its packed form.
    ///
    /// # Errors
    ///
    /// Field validation errors.
    pub fn unpack(packed: &RawRecord, reg: &Registry, ctx: &OpCtx) -> Result<Live<Self>> {
        reg.get_cat::<Self>().create_live(ctx, packed.clone())
    }
}

impl RegEntry for TagTemplate {
    const KIND: EntryType = EntryType::TagTemplate;

    fn defaults() -> RawRecord {
        RawRecord::new()
            .with("name", "New Tag")
            .with("description", "")
            .with("hidden", false)
    }

    fn load(&mut self, loader: &Loader<'_>) -> Result<()> {
        self.id = loader.string_or("id", "")?;
        self.name = loader.string("name")?;
        self.description = loader.string_or("description", "")?;
        self.hidden = loader.bool_or("hidden", false)?;
        self.filter_ignore = loader.bool_or("filter_ignore", false)?;
        Ok(())
    }

    fn save(&self) -> RawRecord {
        RawRecord::new()
            .with("id", self.id.as_str())
            .with("name", self.name.as_str())
            .with("description", self.description.as_str())
            .with("hidden", self.hidden)
            .with("filter_ignore", self.filter_ignore)
    }
}

/// One application of a tag template to an item, with its value.
#[derive(Debug, Clone)]
pub struct TagInstance {
    /// The template (foreign; never copied along with the item).
    pub tag: Live<TagTemplate>,
    /// The `{VAL}` for this application, if the template takes one.
    pub val: Option<Value>,
}

impl TagInstance {
    /// The template name with `{VAL}` substituted.
    #[must_use]
    pub fn display_name(&self) -> String {
        let name = self.tag.borrow().name.clone();
        match &self.val {
            Some(v) => name.replace("{VAL}", &v.to_string()),
            None => name,
        }
    }

    fn to_value(&self) -> Value {
        RawRecord::new()
            .with("tag", self.tag.reg_ref())
            .with("val", self.val.clone())
            .into_value()
    }
}

/// Reads a list of tag instances, dropping those whose template dangles.
///
/// # Errors
///
/// Malformed instances, or a template that fails to load.
pub fn read_tags(loader: &Loader<'_>, field: &str) -> Result<Vec<TagInstance>> {
    let mut out = Vec::new();
    for rec in loader.record_list(field)? {
        let inner = loader.nested(&rec);
        if let Some(tag) = inner.foreign::<TagTemplate>("tag")? {
            out.push(TagInstance {
                tag,
                val: inner.value("val"),
            });
        }
    }
    Ok(out)
}

/// Renders tag instances back to their stored form.
#[must_use]
pub fn save_tags(tags: &[TagInstance]) -> Value {
    Value::List(tags.iter().map(TagInstance::to_value).collect())
}
