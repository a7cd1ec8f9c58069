use crate::acquire::acquirer::{AcquiredBytes, Acquirer};
use crate::acquire::error::AcquireError;
use crate::assets::decode::decode_image;
use crate::compose::compositor::Compositor;
use crate::compose::layout::{ComposeOpts, RenderPlan};
use crate::encode::png::{Export, export_file_name, export_png};
use crate::foundation::core::{Captions, Template};
use crate::foundation::error::{MemeError, MemeResult};
use crate::render::target::RenderTarget;
use crate::session::resource::ResourceTracker;
use crate::session::selection::{
    CommitOutcome, Failure, Selection, SelectionState, SelectionTicket,
};

/// Editing session: one selection, its image resource, the captions and the render target.
///
/// The session is a plain value owned by the caller. Acquisition runs outside of it; results come
/// back through [`Session::commit`], which drops anything that was superseded in the meantime.
/// At most one resource is live per session: selecting or going back releases the current one
/// before anything else happens.
pub struct Session<T: RenderTarget> {
    target: T,
    compositor: Compositor,
    tracker: ResourceTracker,
    generation: u64,
    selection: Option<Selection>,
    captions: Captions,
    rendered: bool,
}

impl<T: RenderTarget> Session<T> {
    /// Create an empty session drawing into `target`.
    pub fn new(target: T, opts: ComposeOpts) -> Self {
        Self {
            target,
            compositor: Compositor::new(opts),
            tracker: ResourceTracker::new(),
            generation: 0,
            selection: None,
            captions: Captions::default(),
            rendered: false,
        }
    }

    /// Use `tracker` for resource bookkeeping (e.g. to observe it from outside).
    pub fn with_tracker(mut self, tracker: ResourceTracker) -> Self {
        self.tracker = tracker;
        self
    }

    /// Current selection, if any.
    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    /// Current captions.
    pub fn captions(&self) -> &Captions {
        &self.captions
    }

    /// Render target.
    pub fn target(&self) -> &T {
        &self.target
    }

    /// Resource bookkeeping shared with every issued handle.
    pub fn tracker(&self) -> &ResourceTracker {
        &self.tracker
    }

    /// Current selection generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Select `template`, releasing the previous resource and clearing the captions.
    pub fn select(&mut self, template: Template) -> SelectionTicket {
        self.release_current();
        self.generation += 1;
        self.captions = Captions::default();
        self.rendered = false;
        tracing::debug!(template = %template.id, generation = self.generation, "selected");
        self.selection = Some(Selection {
            template: template.clone(),
            state: SelectionState::Pending,
        });
        SelectionTicket {
            generation: self.generation,
            template,
        }
    }

    /// Return to browsing: release the resource and drop the selection. Idempotent.
    pub fn back(&mut self) {
        if self.selection.is_none() {
            return;
        }
        self.release_current();
        self.generation += 1;
        self.selection = None;
        self.rendered = false;
    }

    /// `true` if `ticket` still belongs to the pending selection.
    pub fn is_current(&self, ticket: &SelectionTicket) -> bool {
        ticket.generation == self.generation
            && self
                .selection
                .as_ref()
                .is_some_and(|s| s.state.is_pending())
    }

    /// Commit an acquisition result for `ticket`.
    ///
    /// Stale results are released immediately and leave the session untouched. Otherwise the bytes
    /// are decoded, the selection moves to `Ready` or `Failed`, and the surface is redrawn.
    #[tracing::instrument(
        skip(self, ticket, result),
        fields(template = %ticket.template.id, generation = ticket.generation)
    )]
    pub fn commit(
        &mut self,
        ticket: SelectionTicket,
        result: Result<AcquiredBytes, AcquireError>,
    ) -> MemeResult<CommitOutcome> {
        if !self.is_current(&ticket) {
            if let Ok(payload) = result {
                self.tracker.issue(payload).release();
            }
            tracing::warn!(current = self.generation, "discarding stale acquisition result");
            return Ok(CommitOutcome::Stale);
        }

        let (state, outcome) = match result {
            Err(e) => {
                tracing::warn!(error = %e, "image acquisition failed");
                let state = SelectionState::Failed {
                    failure: Failure::Acquisition(e),
                    resource: None,
                };
                (state, CommitOutcome::Failed)
            }
            Ok(payload) => {
                let decoded = decode_image(&payload.bytes);
                let mut resource = self.tracker.issue(payload);
                match decoded {
                    Ok(bitmap) => {
                        resource.attach_bitmap(bitmap);
                        (SelectionState::Ready(resource), CommitOutcome::Ready)
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "acquired bytes are not a displayable image");
                        let state = SelectionState::Failed {
                            failure: Failure::Decode(e.to_string()),
                            resource: Some(resource),
                        };
                        (state, CommitOutcome::Failed)
                    }
                }
            }
        };

        if let Some(selection) = self.selection.as_mut() {
            selection.state = state;
        }
        self.redraw()?;
        Ok(outcome)
    }

    /// Select `template`, acquire its image and commit the result.
    pub async fn load(
        &mut self,
        acquirer: &Acquirer,
        template: Template,
    ) -> MemeResult<CommitOutcome> {
        let ticket = self.select(template);
        let result = acquirer.acquire(&ticket.template.url).await;
        self.commit(ticket, result)
    }

    /// Replace the top caption and redraw.
    pub fn set_top_text(&mut self, text: impl Into<String>) -> MemeResult<Option<RenderPlan>> {
        self.captions.top = text.into();
        self.redraw()
    }

    /// Replace the bottom caption and redraw.
    pub fn set_bottom_text(&mut self, text: impl Into<String>) -> MemeResult<Option<RenderPlan>> {
        self.captions.bottom = text.into();
        self.redraw()
    }

    /// Replace both captions and redraw.
    pub fn set_captions(&mut self, captions: Captions) -> MemeResult<Option<RenderPlan>> {
        self.captions = captions;
        self.redraw()
    }

    /// Redraw from the current state.
    ///
    /// Returns the plan when a bitmap was drawn. A decode failure draws the failure notice over
    /// the existing surface instead; pending and acquisition-failed selections draw nothing.
    pub fn redraw(&mut self) -> MemeResult<Option<RenderPlan>> {
        let Some(selection) = self.selection.as_ref() else {
            return Ok(None);
        };
        match &selection.state {
            SelectionState::Ready(resource) => {
                let Some(bitmap) = resource.bitmap() else {
                    return Ok(None);
                };
                let plan = self.compositor.render_sized(
                    &mut self.target,
                    bitmap,
                    selection.template.dimensions(),
                    &self.captions,
                )?;
                self.rendered = true;
                Ok(Some(plan))
            }
            SelectionState::Failed {
                failure: Failure::Decode(_),
                ..
            } => {
                if self.compositor.render_failure(&mut self.target)? {
                    self.rendered = true;
                }
                Ok(None)
            }
            SelectionState::Pending | SelectionState::Failed { .. } => Ok(None),
        }
    }

    /// Encode the current surface as PNG.
    ///
    /// Fails when nothing is selected, nothing has been drawn for the selection yet, or the
    /// surface cannot be encoded.
    pub fn export(&mut self) -> MemeResult<Export> {
        let Some(selection) = self.selection.as_ref() else {
            return Err(MemeError::export("nothing selected"));
        };
        if !self.rendered {
            return Err(MemeError::export("nothing rendered yet"));
        }
        let file_name = export_file_name(&selection.template);
        let frame = self.target.snapshot()?;
        let png = export_png(&frame)?;
        tracing::info!(file = %file_name, bytes = png.len(), "exported");
        Ok(Export { file_name, png })
    }

    fn release_current(&mut self) {
        if let Some(selection) = self.selection.as_mut() {
            selection.state.release();
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/meme_session.rs"]
mod tests;
