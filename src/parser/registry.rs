//! Decoder registry: one decode function per block kind.

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use super::fields::Fields;
use super::layout::{LayoutClassifier, LayoutRule};
use super::{arc, contour, cut, end, freeform, header, hole, marking, punch};
use crate::config::DecoderOptions;
use crate::error::{DecodeError, DecodeResult};
use crate::model::{BlockKind, Feature, ProfileContext, RawBlock};

/// Everything a decoder may consult besides its own fields.
#[derive(Debug, Clone, Copy)]
pub struct DecodeContext<'a> {
    pub profile: Option<&'a ProfileContext>,
    pub options: &'a DecoderOptions,
    pub layout: &'a LayoutClassifier,
}

/// Signature shared by every block decoder.
pub type DecodeFn = fn(&Fields<'_>, &DecodeContext<'_>) -> DecodeResult<Feature>;

/// Explicitly constructed table of block decoders.
pub struct DecoderRegistry {
    decoders: HashMap<BlockKind, DecodeFn>,
    options: DecoderOptions,
    layout: LayoutClassifier,
}

impl DecoderRegistry {
    /// Registry without any decoders.
    pub fn empty(options: DecoderOptions) -> Self {
        let layout = LayoutClassifier::new(&options.layout_rules);
        Self {
            decoders: HashMap::new(),
            options,
            layout,
        }
    }

    /// Registry with the built-in decoder for every block kind.
    pub fn standard() -> Self {
        Self::with_options(DecoderOptions::default())
    }

    /// Built-in decoders with custom options.
    pub fn with_options(options: DecoderOptions) -> Self {
        let mut registry = Self::empty(options);
        registry.register(BlockKind::Header, header::decode);
        registry.register(BlockKind::OuterContour, contour::decode_outer);
        registry.register(BlockKind::InnerContour, contour::decode_inner);
        registry.register(BlockKind::Cut, cut::decode);
        registry.register(BlockKind::ArcContour, arc::decode);
        registry.register(BlockKind::FreeformContour, freeform::decode);
        registry.register(BlockKind::Hole, hole::decode);
        registry.register(BlockKind::Punch, punch::decode);
        registry.register(BlockKind::Marking, marking::decode);
        registry.register(BlockKind::End, end::decode);
        registry
    }

    /// Install a decoder, returning the one it replaces.
    pub fn register(&mut self, kind: BlockKind, decoder: DecodeFn) -> Option<DecodeFn> {
        self.decoders.insert(kind, decoder)
    }

    /// Append a contour layout heuristic.
    pub fn add_layout_rule(&mut self, rule: Box<dyn LayoutRule>) {
        self.layout.push(rule);
    }

    pub fn options(&self) -> &DecoderOptions {
        &self.options
    }

    pub fn supports(&self, kind: BlockKind) -> bool {
        self.decoders.contains_key(&kind)
    }

    /// Context for calling a decoder directly.
    pub fn context<'a>(&'a self, profile: Option<&'a ProfileContext>) -> DecodeContext<'a> {
        DecodeContext {
            profile,
            options: &self.options,
            layout: &self.layout,
        }
    }

    /// Decode one block, dispatching on its tag.
    pub fn decode(&self, block: &RawBlock, profile: Option<&ProfileContext>) -> DecodeResult<Feature> {
        self.decode_fields(block.kind, &block.fields, profile)
    }

    /// Decode a field list of a given kind.
    pub fn decode_fields(
        &self,
        kind: BlockKind,
        fields: &[String],
        profile: Option<&ProfileContext>,
    ) -> DecodeResult<Feature> {
        let decoder = self
            .decoders
            .get(&kind)
            .ok_or(DecodeError::NoDecoder { kind })?;
        let fields = Fields::new(kind, fields);
        let feature = decoder(&fields, &self.context(profile))?;
        debug!(kind = %kind, feature = feature.type_name(), "block decoded");
        Ok(feature)
    }
}

impl fmt::Debug for DecoderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<BlockKind> = self.decoders.keys().copied().collect();
        kinds.sort();
        f.debug_struct("DecoderRegistry")
            .field("kinds", &kinds)
            .field("options", &self.options)
            .field("layout", &self.layout)
            .finish()
    }
}

impl Default for DecoderRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Hole, Punch};
    use crate::parser::layout::{ContourLayout, FieldStats};

    fn fixed_punch(_fields: &Fields<'_>, _ctx: &DecodeContext<'_>) -> DecodeResult<Feature> {
        Ok(Feature::Punch(Punch {
            diameter: 42.0,
            ..Default::default()
        }))
    }

    #[test]
    fn test_standard_covers_every_kind() {
        let registry = DecoderRegistry::standard();
        for kind in BlockKind::ALL {
            assert!(registry.supports(kind), "missing decoder for {}", kind);
        }
    }

    #[test]
    fn test_dispatch_by_tag() {
        let registry = DecoderRegistry::standard();
        let block = RawBlock::new(BlockKind::Hole, &["v", "1857.15", "163.20", "22.00", "0.00"]);
        let feature = registry.decode(&block, None).expect("Should decode");
        assert_eq!(feature.kind(), BlockKind::Hole);
    }

    #[test]
    fn test_register_replaces_decoder() {
        let mut registry = DecoderRegistry::standard();
        assert!(registry.register(BlockKind::Punch, fixed_punch).is_some());
        let feature = registry
            .decode_fields(BlockKind::Punch, &[], None)
            .expect("Should decode");
        match feature {
            Feature::Punch(p) => assert_eq!(p.diameter, 42.0),
            other => panic!("unexpected feature {:?}", other),
        }
    }

    #[test]
    fn test_missing_decoder() {
        let registry = DecoderRegistry::empty(DecoderOptions::default());
        let result = registry.decode_fields(BlockKind::Hole, &["1".into()], None);
        assert_eq!(result, Err(DecodeError::NoDecoder { kind: BlockKind::Hole }));
    }

    #[test]
    fn test_decode_error_propagates() {
        let registry = DecoderRegistry::standard();
        let result = registry.decode_fields(BlockKind::Hole, &["v".into(), "12".into()], None);
        assert!(matches!(result, Err(DecodeError::TooFewFields { .. })));

        let ok = registry.decode_fields(BlockKind::Hole, &["1".into(), "2".into(), "3".into()], None);
        assert!(matches!(ok, Ok(Feature::Hole(Hole { diameter, .. })) if diameter == 3.0));
    }

    #[test]
    fn test_options_carried() {
        let registry = DecoderRegistry::with_options(DecoderOptions::with_cut_regions());
        assert!(registry.options().derive_cut_regions);
        assert!(!DecoderRegistry::default().options().derive_cut_regions);
    }

    struct AlwaysMatrix;

    impl LayoutRule for AlwaysMatrix {
        fn name(&self) -> &'static str {
            "always_matrix"
        }

        fn classify(&self, _stats: &FieldStats) -> Option<ContourLayout> {
            Some(ContourLayout::Matrix)
        }
    }

    #[test]
    fn test_layout_rule_reaches_decoders() {
        let block = RawBlock::new(
            BlockKind::OuterContour,
            &["0", "0", "100", "0", "100", "50", "0", "50"],
        );
        let point_count = |registry: &DecoderRegistry| match registry.decode(&block, None) {
            Ok(Feature::OuterContour(c)) => c.points.len(),
            other => panic!("unexpected result {:?}", other),
        };

        let mut registry = DecoderRegistry::standard();
        assert_eq!(point_count(&registry), 4);

        registry.add_layout_rule(Box::new(AlwaysMatrix));
        assert_eq!(point_count(&registry), 3);
    }
}
