//! Canvas bounds shared by nodes and annotations.

use crate::error::DefError;
use crate::fallible::{BuildMode, Cause, Fault, FaultCarrier, FaultTree, FieldId, Scope, Slot};

/// Fields of [`BoundsDef`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundsField {
    /// Left edge.
    X,
    /// Top edge.
    Y,
    /// Horizontal extent.
    Width,
    /// Vertical extent.
    Height,
}

impl FieldId for BoundsField {
    fn name(self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Width => "width",
            Self::Height => "height",
        }
    }
}

/// Position and size of a canvas element, in pixels.
///
/// All four fields are required; a field that could not be loaded is `None`
/// and has an entry in the fault tree.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundsDef {
    x: Option<i32>,
    y: Option<i32>,
    width: Option<i32>,
    height: Option<i32>,
    faults: FaultTree,
}

impl BoundsDef {
    /// A tolerant builder.
    #[must_use]
    pub fn builder() -> BoundsDefBuilder {
        BoundsDefBuilder::new()
    }

    /// A node with every required field recorded as missing.
    #[must_use]
    pub fn placeholder() -> Self {
        Self {
            x: None,
            y: None,
            width: None,
            height: None,
            faults: FaultTree::missing(&[
                BoundsField::X,
                BoundsField::Y,
                BoundsField::Width,
                BoundsField::Height,
            ]),
        }
    }

    /// Left edge.
    #[must_use]
    pub const fn x(&self) -> Option<i32> {
        self.x
    }

    /// Top edge.
    #[must_use]
    pub const fn y(&self) -> Option<i32> {
        self.y
    }

    /// Horizontal extent.
    #[must_use]
    pub const fn width(&self) -> Option<i32> {
        self.width
    }

    /// Vertical extent.
    #[must_use]
    pub const fn height(&self) -> Option<i32> {
        self.height
    }

    /// Fault sub-tree of one field; `None` if the field loaded cleanly.
    #[must_use]
    pub fn fault_tree_for(&self, field: BoundsField) -> Option<&FaultTree> {
        self.faults.field(field)
    }

    /// The fault that made `field` fall back to its default.
    #[must_use]
    pub fn supply_fault(&self, field: BoundsField) -> Option<&Fault> {
        self.fault_tree_for(field).and_then(FaultTree::fault)
    }
}

impl FaultCarrier for BoundsDef {
    fn fault_tree(&self) -> &FaultTree {
        &self.faults
    }

    fn with_fault(mut self, fault: Fault) -> Self {
        self.faults = self.faults.inject(fault);
        self
    }
}

/// Builder for [`BoundsDef`].
#[derive(Debug, Clone, Default)]
pub struct BoundsDefBuilder {
    mode: BuildMode,
    x: Slot<i32>,
    y: Slot<i32>,
    width: Slot<i32>,
    height: Slot<i32>,
}

impl BoundsDefBuilder {
    const ENTITY: &'static str = "BoundsDef";

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
    pub fn from_def(def: &BoundsDef) -> Self {
        Self {
            mode: BuildMode::Tolerant,
            x: Slot::copied(def.x, def.faults.field_subtree(BoundsField::X)),
            y: Slot::copied(def.y, def.faults.field_subtree(BoundsField::Y)),
            width: Slot::copied(def.width, def.faults.field_subtree(BoundsField::Width)),
            height: Slot::copied(def.height, def.faults.field_subtree(BoundsField::Height)),
        }
    }

    const fn scope(&self) -> Scope {
        Scope::new(Self::ENTITY, self.mode)
    }

    /// Sets the left edge.
    pub fn set_x(&mut self, x: i32) -> &mut Self {
        self.x.assign(x);
        self
    }

    /// Sets the left edge from a supply result.
    ///
    /// # Errors
    ///
    /// Returns [`DefError::Strict`] if `x` failed and the builder is strict.
    pub fn set_x_with<E: Into<Cause>>(
        &mut self,
        x: Result<i32, E>,
        fallback: Option<i32>,
    ) -> Result<&mut Self, DefError> {
        let scope = self.scope();
        self.x.supply(scope, &BoundsField::X.key(), x, fallback)?;
        Ok(self)
    }

    /// Sets the top edge.
    pub fn set_y(&mut self, y: i32) -> &mut Self {
        self.y.assign(y);
        self
    }

    /// Sets the top edge from a supply result.
    ///
    /// # Errors
    ///
    /// Returns [`DefError::Strict`] if `y` failed and the builder is strict.
    pub fn set_y_with<E: Into<Cause>>(
        &mut self,
        y: Result<i32, E>,
        fallback: Option<i32>,
    ) -> Result<&mut Self, DefError> {
        let scope = self.scope();
        self.y.supply(scope, &BoundsField::Y.key(), y, fallback)?;
        Ok(self)
    }

    /// Sets the width.
    pub fn set_width(&mut self, width: i32) -> &mut Self {
        self.width.assign(width);
        self
    }

    /// Sets the width from a supply result.
    ///
    /// # Errors
    ///
    /// Returns [`DefError::Strict`] if `width` failed and the builder is
    /// strict.
    pub fn set_width_with<E: Into<Cause>>(
        &mut self,
        width: Result<i32, E>,
        fallback: Option<i32>,
    ) -> Result<&mut Self, DefError> {
        let scope = self.scope();
        self.width
            .supply(scope, &BoundsField::Width.key(), width, fallback)?;
        Ok(self)
    }

    /// Sets the height.
    pub fn set_height(&mut self, height: i32) -> &mut Self {
        self.height.assign(height);
        self
    }

    /// Sets the height from a supply result.
    ///
    /// # Errors
    ///
    /// Returns [`DefError::Strict`] if `height` failed and the builder is
    /// strict.
    pub fn set_height_with<E: Into<Cause>>(
        &mut self,
        height: Result<i32, E>,
        fallback: Option<i32>,
    ) -> Result<&mut Self, DefError> {
        let scope = self.scope();
        self.height
            .supply(scope, &BoundsField::Height.key(), height, fallback)?;
        Ok(self)
    }

    /// Builds the node, recording every unset field as missing.
    ///
    /// # Errors
    ///
    /// Returns [`DefError::Strict`] if a field is missing and the builder is
    /// strict.
    pub fn build(mut self) -> Result<BoundsDef, DefError> {
        let scope = self.scope();
        self.x.require(scope, &BoundsField::X.key())?;
        self.y.require(scope, &BoundsField::Y.key())?;
        self.width.require(scope, &BoundsField::Width.key())?;
        self.height.require(scope, &BoundsField::Height.key())?;

        let (x, x_faults) = self.x.into_parts();
        let (y, y_faults) = self.y.into_parts();
        let (width, width_faults) = self.width.into_parts();
        let (height, height_faults) = self.height.into_parts();
        let faults = FaultTree::merge(
            None,
            [
                (BoundsField::X.key(), x_faults),
                (BoundsField::Y.key(), y_faults),
                (BoundsField::Width.key(), width_faults),
                (BoundsField::Height.key(), height_faults),
            ],
        );

        Ok(BoundsDef {
            x,
            y,
            width,
            height,
            faults,
        })
    }
}
