use std::sync::Arc;

use error_stack::{Result, ResultExt};
use ton_utils::{ArcCell, Cell, CellBuilder, CellBuilderExt, CellParser, CellParserExt, TonCellError};

use crate::error::{DecodeError, EncodeError};

/// Bijective mapping between a type and its cell layout.
///
/// Implementors describe the layout with `store`/`load` in terms of raw cell errors; the provided
/// methods turn those into typed encode/decode reports at the public boundary.
pub trait CellCodec: Sized {
    /// Name used in error reports.
    const KIND: &'static str;

    fn store(&self, builder: &mut CellBuilder) -> std::result::Result<(), TonCellError>;

    fn load(parser: &mut CellParser) -> std::result::Result<Self, TonCellError>;

    fn to_cell(&self) -> Result<Cell, EncodeError> {
        let mut builder = CellBuilder::new();
        self.store(&mut builder)
            .and_then(|_| builder.build())
            .change_context(EncodeError::Cell(Self::KIND))
    }

    fn to_arc_cell(&self) -> Result<ArcCell, EncodeError> {
        self.to_cell().map(Arc::new)
    }

    fn from_cell(cell: &Cell) -> Result<Self, DecodeError> {
        Self::load(&mut cell.parser()).change_context(DecodeError::Malformed(Self::KIND))
    }
}

pub(crate) fn store_ref<T: CellCodec>(
    builder: &mut CellBuilder,
    value: &T,
) -> std::result::Result<(), TonCellError> {
    let mut inner = CellBuilder::new();
    value.store(&mut inner)?;
    builder.store_reference(&Arc::new(inner.build()?))?;
    Ok(())
}

pub(crate) fn store_optional<T: CellCodec>(
    builder: &mut CellBuilder,
    value: Option<&T>,
) -> std::result::Result<(), TonCellError> {
    match value {
        Some(value) => {
            builder.store_bit(true)?;
            store_ref(builder, value)
        }
        None => {
            builder.store_bit(false)?;
            Ok(())
        }
    }
}

pub(crate) fn load_ref<T: CellCodec>(
    parser: &mut CellParser,
) -> std::result::Result<T, TonCellError> {
    let cell = parser.next_reference()?;
    let value = T::load(&mut cell.parser())?;
    Ok(value)
}

pub(crate) fn load_optional<T: CellCodec>(
    parser: &mut CellParser,
) -> std::result::Result<Option<T>, TonCellError> {
    parser
        .load_optional_ref()?
        .map(|cell| T::load(&mut cell.parser()))
        .transpose()
}

pub(crate) fn store_optional_cell(
    builder: &mut CellBuilder,
    cell: Option<&ArcCell>,
) -> std::result::Result<(), TonCellError> {
    builder.store_optional_ref(cell.cloned())?;
    Ok(())
}
