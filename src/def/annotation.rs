//! Workflow annotations: free text drawn on the canvas.

use crate::error::DefError;
use crate::fallible::{BuildMode, Cause, Fault, FaultCarrier, FaultTree, FieldId, Scope, Slot};

use super::bounds::BoundsDef;

/// Fields of [`AnnotationDef`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnnotationField {
    /// Annotation text.
    Text,
    /// Where the annotation is drawn.
    Bounds,
    /// Border width in pixels.
    BorderSize,
}

impl FieldId for AnnotationField {
    fn name(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Bounds => "bounds",
            Self::BorderSize => "border_size",
        }
    }
}

/// A text annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationDef {
    text: Option<String>,
    bounds: Option<BoundsDef>,
    border_size: Option<i32>,
    faults: FaultTree,
}

impl AnnotationDef {
    /// A tolerant builder.
    #[must_use]
    pub fn builder() -> AnnotationDefBuilder {
        AnnotationDefBuilder::new()
    }

    /// A node with every required field recorded as missing.
    #[must_use]
    pub fn placeholder() -> Self {
        Self {
            text: None,
            bounds: None,
            border_size: None,
            faults: FaultTree::missing(&[AnnotationField::Text, AnnotationField::Bounds]),
        }
    }

    /// Annotation text.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Canvas bounds.
    #[must_use]
    pub const fn bounds(&self) -> Option<&BoundsDef> {
        self.bounds.as_ref()
    }

    /// Border width, if set.
    #[must_use]
    pub const fn border_size(&self) -> Option<i32> {
        self.border_size
    }

    /// The bounds, but only when they carry faults.
    #[must_use]
    pub fn faulty_bounds(&self) -> Option<&BoundsDef> {
        self.bounds.as_ref().filter(|bounds| bounds.has_faults())
    }

    /// Fault sub-tree of one field; `None` if the field loaded cleanly.
    #[must_use]
    pub fn fault_tree_for(&self, field: AnnotationField) -> Option<&FaultTree> {
        self.faults.field(field)
    }

    /// The fault that made `field` fall back to its default.
    #[must_use]
    pub fn supply_fault(&self, field: AnnotationField) -> Option<&Fault> {
        self.fault_tree_for(field).and_then(FaultTree::fault)
    }
}

impl FaultCarrier for AnnotationDef {
    fn fault_tree(&self) -> &FaultTree {
        &self.faults
    }

    fn with_fault(mut self, fault: Fault) -> Self {
        self.faults = self.faults.inject(fault);
        self
    }
}

/// Builder for [`AnnotationDef`].
#[derive(Debug, Clone, Default)]
pub struct AnnotationDefBuilder {
    mode: BuildMode,
    text: Slot<String>,
    bounds: Slot<BoundsDef>,
    border_size: Slot<i32>,
}

impl AnnotationDefBuilder {
    const ENTITY: &'static str = "AnnotationDef";

    /// A tolerant builder with every field unset.
    #[must_use]
    pub fn new() -> Self {
        Self::with_mode(BuildMode::Tolerant)
    }

    /// A builder that aborts at the first field that cannot be supplied.
    #[must_use]
    pub fn strict() -> Self {
        Self::with_mode(BuildMode::Strict)
    }

    /// A builder in the given mode.
    #[must_use]
    pub fn with_mode(mode: BuildMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// A tolerant builder pre-populated from `def`, faults included.
    #[must_use]
    pub fn from_def(def: &AnnotationDef) -> Self {
        let faults = &def.faults;
        Self {
            mode: BuildMode::Tolerant,
            text: Slot::copied(def.text.clone(), faults.field_subtree(AnnotationField::Text)),
            bounds: Slot::copied(
                def.bounds.clone(),
                faults.field_subtree(AnnotationField::Bounds),
            ),
            border_size: Slot::copied(
                def.border_size,
                faults.field_subtree(AnnotationField::BorderSize),
            ),
        }
    }

    const fn scope(&self) -> Scope {
        Scope::new(Self::ENTITY, self.mode)
    }

    /// Sets the text.
    pub fn set_text(&mut self, text: impl Into<String>) -> &mut Self {
        self.text.assign(text.into());
        self
    }

    /// Sets the text from a supply result.
    ///
    /// # Errors
    ///
    /// Returns [`DefError::Strict`] if `text` failed and the builder is
    /// strict.
    pub fn set_text_with<E: Into<Cause>>(
        &mut self,
        text: Result<String, E>,
        fallback: Option<String>,
    ) -> Result<&mut Self, DefError> {
        let scope = self.scope();
        self.text
            .supply(scope, &AnnotationField::Text.key(), text, fallback)?;
        Ok(self)
    }

    /// Sets the bounds; faults the bounds already carry stay visible here.
    pub fn set_bounds(&mut self, bounds: BoundsDef) -> &mut Self {
        self.bounds.assign_node(bounds);
        self
    }

    /// Sets the bounds from a supply result.
    ///
    /// # Errors
    ///
    /// Returns [`DefError::Strict`] if `bounds` failed and the builder is
    /// strict.
    pub fn set_bounds_with<E: Into<Cause>>(
        &mut self,
        bounds: Result<BoundsDef, E>,
        fallback: Option<BoundsDef>,
    ) -> Result<&mut Self, DefError> {
        let scope = self.scope();
        self.bounds
            .supply_node(scope, &AnnotationField::Bounds.key(), bounds, fallback)?;
        Ok(self)
    }

    /// Sets the border width.
    pub fn set_border_size(&mut self, border_size: i32) -> &mut Self {
        self.border_size.assign(border_size);
        self
    }

    /// Sets the optional border width from a supply result.
    ///
    /// # Errors
    ///
    /// Returns [`DefError::Strict`] if `border_size` failed and the builder
    /// is strict.
    pub fn set_border_size_with<E: Into<Cause>>(
        &mut self,
        border_size: Result<Option<i32>, E>,
        fallback: Option<i32>,
    ) -> Result<&mut Self, DefError> {
        let scope = self.scope();
        self.border_size.supply_optional(
            scope,
            &AnnotationField::BorderSize.key(),
            border_size,
            fallback,
        )?;
        Ok(self)
    }

    /// Builds the node, recording unset required fields as missing.
    ///
    /// # Errors
    ///
    /// Returns [`DefError::Strict`] if a required field is missing and the
    /// builder is strict.
    pub fn build(mut self) -> Result<AnnotationDef, DefError> {
        let scope = self.scope();
        self.text.require(scope, &AnnotationField::Text.key())?;
        self.bounds.require(scope, &AnnotationField::Bounds.key())?;

        let (text, text_faults) = self.text.into_parts();
        let (bounds, bounds_faults) = self.bounds.into_parts();
        let (border_size, border_size_faults) = self.border_size.into_parts();
        let faults = FaultTree::merge(
            None,
            [
                (AnnotationField::Text.key(), text_faults),
                (AnnotationField::Bounds.key(), bounds_faults),
                (AnnotationField::BorderSize.key(), border_size_faults),
            ],
        );

        Ok(AnnotationDef {
            text,
            bounds,
            border_size,
            faults,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::def::BoundsField;
    use crate::fallible::FaultKey;

    fn bounds_missing_height() -> Result<BoundsDef, DefError> {
        let mut builder = BoundsDef::builder();
        builder.set_x(0).set_y(0).set_width(200);
        builder.build()
    }

    #[test]
    fn faulty_bounds_propagate_to_the_annotation() -> Result<(), DefError> {
        let mut builder = AnnotationDef::builder();
        builder
            .set_text("Read the input")
            .set_bounds(bounds_missing_height()?);
        let annotation = builder.build()?;

        assert!(annotation.has_faults());
        assert!(annotation.faulty_bounds().is_some());
        let height = annotation.fault_tree().at(&[
            AnnotationField::Bounds.key(),
            BoundsField::Height.key(),
        ]);
        assert!(height.is_some_and(FaultTree::has_faults));
        Ok(())
    }

    #[test]
    fn failed_bounds_mark_the_default() -> Result<(), DefError> {
        let mut builder = AnnotationDef::builder();
        builder
            .set_text("note")
            .set_bounds_with(Err("bounds is a string"), Some(BoundsDef::placeholder()))?;
        let annotation = builder.build()?;

        let stored = annotation.faulty_bounds();
        assert!(stored.is_some());
        let bounds_tree = annotation.fault_tree_for(AnnotationField::Bounds);
        assert_eq!(
            bounds_tree.and_then(FaultTree::self_fault),
            Some(&Fault::new("bounds is a string"))
        );
        assert_eq!(stored.map(BoundsDef::fault_tree), bounds_tree);
        Ok(())
    }

    #[test]
    fn clean_bounds_are_not_faulty() -> Result<(), DefError> {
        let mut bounds = BoundsDef::builder();
        bounds.set_x(1).set_y(1).set_width(1).set_height(1);
        let mut builder = AnnotationDef::builder();
        builder.set_text("ok").set_bounds(bounds.build()?);
        let annotation = builder.build()?;
        assert!(annotation.faulty_bounds().is_none());
        assert!(annotation.fault_tree().child(&FaultKey::Field("bounds")).is_none());
        Ok(())
    }
}
