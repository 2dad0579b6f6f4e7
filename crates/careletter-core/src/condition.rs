use crate::ast::{BlockTag, ClientTag, Governing, TrackTag};
use crate::context::{ChoiceContext, ClientType};

/// Decides whether content inside `tag` is emitted for `context`.
pub fn should_render(tag: &BlockTag, context: &ChoiceContext) -> bool {
    match tag {
        BlockTag::Client(ClientTag::Indiv) => context.client_type == ClientType::Individual,
        BlockTag::Client(ClientTag::Corp) => context.client_type == ClientType::Corporate,
        BlockTag::Track(TrackTag { assigned, track }) => {
            context.claim_already_assigned == *assigned && context.selected_track == *track
        }
    }
}

/// Evaluates a tag given by name. Unknown names fail closed.
pub fn should_render_name(name: &str, context: &ChoiceContext) -> bool {
    BlockTag::from_name(name)
        .map(|tag| should_render(&tag, context))
        .unwrap_or(false)
}

impl Governing {
    /// Content renders only if every active block renders.
    pub fn renders(&self, context: &ChoiceContext) -> bool {
        self.tags().all(|tag| should_render(&tag, context))
    }
}
