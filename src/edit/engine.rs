use std::sync::Arc;

use crate::{
    codec::decode::decode_document,
    codec::encode::encode_document,
    edit::command::{Command, DisplayTarget},
    edit::services::{
        ConfigSource, DEFAULT_BACK_DISPLAY_KEY, Notice, TemplateStore, Transport, read_source,
    },
    foundation::core::{MAX_GRID_DIM, SlotRef, TILE_BYTES},
    foundation::error::{DeckError, DeckResult},
    model::action::{Action, ActionKind, ButtonSetting},
    model::display::Display,
    model::document::{ConfigDocument, Page},
    raster::compose::ImagePipeline,
};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
/// Outcome of a committed edit.
pub struct Applied {
    /// Transient, non-fatal messages for the user.
    pub notices: Vec<Notice>,
}

/// Single owner of the live document.
///
/// Every edit goes through [`Editor::apply`], which works on a private copy of the current
/// snapshot, re-renders the displays it touches, checks every document invariant and only then
/// swaps the copy in. A rejected edit leaves the committed snapshot untouched. Readers hold
/// [`Arc`] snapshots that never change after they are handed out.
pub struct Editor {
    document: Arc<ConfigDocument>,
    pipeline: ImagePipeline,
    store: Box<dyn TemplateStore>,
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("pages", &self.document.pages.len())
            .field("pipeline", &self.pipeline)
            .finish_non_exhaustive()
    }
}

impl Editor {
    /// Start from an empty default document whose back template is restored from `store`, or
    /// rendered from the built-in arrow when none is persisted.
    pub fn new(pipeline: ImagePipeline, store: Box<dyn TemplateStore>) -> DeckResult<Self> {
        let template = restore_template(&pipeline, store.as_ref())?;
        Ok(Self {
            document: Arc::new(ConfigDocument::new(template)),
            pipeline,
            store,
        })
    }

    /// Take ownership of an existing document after validating it.
    pub fn with_document(
        document: ConfigDocument,
        pipeline: ImagePipeline,
        store: Box<dyn TemplateStore>,
    ) -> DeckResult<Self> {
        document.validate()?;
        Ok(Self {
            document: Arc::new(document),
            pipeline,
            store,
        })
    }

    /// Current committed document.
    pub fn document(&self) -> &ConfigDocument {
        &self.document
    }

    /// Shared handle to the current committed document.
    pub fn snapshot(&self) -> Arc<ConfigDocument> {
        Arc::clone(&self.document)
    }

    /// Renderer used for display edits.
    pub fn pipeline(&self) -> &ImagePipeline {
        &self.pipeline
    }

    /// Persistence backing the default-back template.
    pub fn store(&self) -> &dyn TemplateStore {
        self.store.as_ref()
    }

    #[tracing::instrument(skip(self, command), fields(op = command.name()))]
    /// Apply one edit atomically.
    pub fn apply(&mut self, command: Command) -> DeckResult<Applied> {
        let mut next = ConfigDocument::clone(&self.document);
        let mut notices = Vec::new();
        let mut persist = None;

        match command {
            Command::SetBrightness { brightness } => next.brightness = brightness,
            Command::SetDimensions { width, height } => set_dimensions(&mut next, width, height)?,
            Command::AddPage { back_link } => add_page(&mut next, back_link)?,
            Command::DeletePage { page } => delete_page(&mut next, page)?,
            Command::SetButtonSettings {
                slot,
                which,
                action,
            } => {
                action.kind.validate()?;
                *button_mut(&mut next, slot)?.action_mut(which) = action;
            }
            Command::SetDisplaySettings { target, display } => match target {
                DisplayTarget::DefaultBack => {
                    if self.render_into(
                        &mut next.default_back_display,
                        *display,
                        None,
                        &mut notices,
                    )? {
                        persist = Some(next.default_back_display.clone());
                    }
                }
                DisplayTarget::Slot(slot) => {
                    let current = display_mut(&mut next, slot)?;
                    self.render_into(current, *display, Some(slot), &mut notices)?;
                }
            },
            Command::SetOriginalImage { slot, image } => {
                let current = display_mut(&mut next, slot)?;
                let mut candidate = current.clone();
                candidate.original_image = image;
                self.render_into(current, candidate, Some(slot), &mut notices)?;
            }
            Command::DeleteImage { slot } => *display_mut(&mut next, slot)? = Display::default(),
            Command::SwitchButtons { a, b } => switch_buttons(&mut next, a, b)?,
            Command::UpdateAllDefaultBackImages { display } => {
                update_all_default_back_images(&mut next, &display);
            }
            Command::MakeDefaultBackButton { slot } => {
                let template = next.default_back_display.clone();
                let current = display_mut(&mut next, slot)?;
                *current =
                    Display::back_copy(&template, current.previous_page, current.previous_display);
            }
            Command::SetState { document } => next = *document,
        }

        next.validate()?;
        self.document = Arc::new(next);
        tracing::debug!(
            pages = self.document.pages.len(),
            notices = notices.len(),
            "edit committed"
        );

        if let Some(template) = persist
            && let Err(err) = self.persist_template(&template)
        {
            tracing::warn!(%err, "default back template not persisted");
            notices.push(Notice::TemplateNotPersisted {
                message: err.to_string(),
            });
        }
        Ok(Applied { notices })
    }

    #[tracing::instrument(skip(self, source))]
    /// Decode a configuration and make it the live document.
    pub fn load(&mut self, source: ConfigSource) -> DeckResult<Applied> {
        let bytes = read_source(source)?;
        let document = decode_document(&bytes)?;
        let applied = self.apply(Command::SetState {
            document: Box::new(document),
        })?;
        tracing::info!(
            bytes = bytes.len(),
            pages = self.document.pages.len(),
            "configuration loaded"
        );
        Ok(applied)
    }

    /// Encode the live document into the device format.
    pub fn encode(&self) -> DeckResult<Vec<u8>> {
        encode_document(&self.document)
    }

    #[tracing::instrument(skip(self, transport))]
    /// Encode the live document and hand exactly that buffer to `transport`.
    pub fn upload(&self, transport: &mut dyn Transport) -> DeckResult<usize> {
        let bytes = self.encode()?;
        transport.send(&bytes)?;
        tracing::info!(bytes = bytes.len(), "configuration sent");
        Ok(bytes.len())
    }

    // Ok(false) means the source could not be rendered and `target` was left as is.
    fn render_into(
        &self,
        target: &mut Display,
        mut candidate: Display,
        slot: Option<SlotRef>,
        notices: &mut Vec<Notice>,
    ) -> DeckResult<bool> {
        match self.pipeline.render(&candidate) {
            Ok(bitmap) => {
                candidate.set_converted_image(bitmap);
                *target = candidate;
                Ok(true)
            }
            Err(DeckError::ImageDecode(message)) => {
                tracing::warn!(?slot, %message, "display kept its previous image");
                notices.push(Notice::ImageNotRendered { slot, message });
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    fn persist_template(&mut self, template: &Display) -> DeckResult<()> {
        let json = serde_json::to_string(template)?;
        self.store.set(DEFAULT_BACK_DISPLAY_KEY, &json)
    }
}

fn restore_template(pipeline: &ImagePipeline, store: &dyn TemplateStore) -> DeckResult<Display> {
    match store.get(DEFAULT_BACK_DISPLAY_KEY) {
        Ok(Some(json)) => match serde_json::from_str::<Display>(&json) {
            Ok(restored) if restored.converted_image().len() == TILE_BYTES => {
                return Ok(restored);
            }
            Ok(restored) => tracing::warn!(
                len = restored.converted_image().len(),
                "persisted default back template has a bad bitmap; using the built-in one"
            ),
            Err(err) => tracing::warn!(
                %err,
                "persisted default back template is unreadable; using the built-in one"
            ),
        },
        Ok(None) => {}
        Err(err) => tracing::warn!(%err, "default back template store is unavailable"),
    }
    pipeline.default_back_display()
}

fn button_mut(doc: &mut ConfigDocument, slot: SlotRef) -> DeckResult<&mut ButtonSetting> {
    let pages = doc.pages.len();
    doc.pages
        .get_mut(slot.page)
        .ok_or_else(|| DeckError::validation(format!("page {} of {pages} does not exist", slot.page)))?
        .buttons
        .get_mut(slot.button)
        .ok_or_else(|| DeckError::validation(format!("{slot} does not exist")))
}

fn display_mut(doc: &mut ConfigDocument, slot: SlotRef) -> DeckResult<&mut Display> {
    let pages = doc.pages.len();
    doc.pages
        .get_mut(slot.page)
        .ok_or_else(|| DeckError::validation(format!("page {} of {pages} does not exist", slot.page)))?
        .displays
        .get_mut(slot.button)
        .ok_or_else(|| DeckError::validation(format!("{slot} does not exist")))
}

fn page_ref(index: usize) -> DeckResult<u16> {
    u16::try_from(index)
        .map_err(|_| DeckError::validation(format!("page index {index} exceeds the format limit")))
}

fn set_dimensions(
    doc: &mut ConfigDocument,
    width: Option<u8>,
    height: Option<u8>,
) -> DeckResult<()> {
    let width = width.unwrap_or(doc.tile_grid_width);
    let height = height.unwrap_or(doc.tile_grid_height);
    for (name, dim) in [("width", width), ("height", height)] {
        if dim == 0 || dim > MAX_GRID_DIM {
            return Err(DeckError::validation(format!(
                "grid {name} {dim} is outside 1..={MAX_GRID_DIM}"
            )));
        }
    }

    let before = doc.tile_count();
    doc.tile_grid_width = width;
    doc.tile_grid_height = height;
    let tiles = doc.tile_count();
    if tiles < before && !doc.pages.is_empty() {
        tracing::info!(
            dropped = before - tiles,
            pages = doc.pages.len(),
            "grid shrunk; trailing tiles discarded"
        );
    }
    for page in &mut doc.pages {
        page.buttons.resize_with(tiles, ButtonSetting::default);
        page.displays.resize_with(tiles, Display::default);
    }
    Ok(())
}

fn add_page(doc: &mut ConfigDocument, back_link: Option<SlotRef>) -> DeckResult<()> {
    let new_index = doc.pages.len();
    let target = page_ref(new_index)?;
    let mut page = Page::with_tiles(doc.tile_count());

    if let Some(origin) = back_link {
        if doc.button(origin).is_none() {
            return Err(DeckError::validation(format!(
                "back link {origin} does not exist"
            )));
        }
        if let Some(back) = page.buttons.first_mut() {
            back.primary = Action::change_page(page_ref(origin.page)?);
        }
        if let Some(display) = page.displays.first_mut() {
            *display = Display::back_copy(
                &doc.default_back_display,
                Some(origin.page),
                Some(origin.button),
            );
        }
        doc.pages.push(page);
        button_mut(doc, origin)?.primary = Action::change_page(target);
    } else {
        doc.pages.push(page);
    }
    Ok(())
}

fn delete_page(doc: &mut ConfigDocument, page: usize) -> DeckResult<()> {
    if page >= doc.pages.len() {
        return Err(DeckError::validation(format!(
            "cannot delete page {page}: {} page(s) exist",
            doc.pages.len()
        )));
    }
    doc.pages.remove(page);

    let Ok(deleted) = u16::try_from(page) else {
        return Ok(());
    };
    for p in &mut doc.pages {
        for button in &mut p.buttons {
            for action in button.actions_mut() {
                if let ActionKind::ChangePage { page: target } = &mut action.kind
                    && *target >= deleted
                {
                    *target = target.saturating_sub(1);
                }
            }
        }
    }
    Ok(())
}

fn switch_buttons(doc: &mut ConfigDocument, a: SlotRef, b: SlotRef) -> DeckResult<()> {
    for slot in [a, b] {
        if !doc.contains(slot) {
            return Err(DeckError::validation(format!("{slot} does not exist")));
        }
    }
    if a == b {
        return Ok(());
    }
    let button_a = std::mem::take(button_mut(doc, a)?);
    let button_b = std::mem::replace(button_mut(doc, b)?, button_a);
    *button_mut(doc, a)? = button_b;

    let display_a = std::mem::take(display_mut(doc, a)?);
    let display_b = std::mem::replace(display_mut(doc, b)?, display_a);
    *display_mut(doc, a)? = display_b;
    Ok(())
}

fn update_all_default_back_images(doc: &mut ConfigDocument, template: &Display) {
    let mut updated = 0usize;
    for page in &mut doc.pages {
        for display in &mut page.displays {
            if display.is_generated_from_default_back_image {
                *display =
                    Display::back_copy(template, display.previous_page, display.previous_display);
                updated += 1;
            }
        }
    }
    tracing::debug!(updated, "default back displays refreshed");
}

#[cfg(test)]
#[path = "../../tests/unit/edit/engine.rs"]
mod tests;
