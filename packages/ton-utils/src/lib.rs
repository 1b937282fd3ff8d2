use std::sync::Arc;

pub use alloy_primitives::{B256, U256};
use num_bigint::BigUint;
use num_traits::ToPrimitive;
use sha3::{Digest, Keccak256};
use tonlib_core::cell::BagOfCells;
pub use tonlib_core::cell::{ArcCell, Cell, CellBuilder, CellParser, TonCellError};

mod address;

pub use address::{Address, AddressParseError};

pub const BITS_PER_BYTE: usize = 8;
pub const BYTES_PER_CELL: usize = 96;
pub const HASH_BITS: usize = 256;
pub const UINT256_BITS: usize = 256;
/// Leading 32 bits of every bounced message body.
pub const BOUNCED_PREFIX: u32 = 0xffff_ffff;

/// Postfix application, so that a value at the end of a long expression chain can be handed to a
/// function without wrapping the whole chain, e.g. `response.then(Ok)`.
pub trait FnExt {
    fn then<F, T>(self, func: F) -> T
    where
        F: FnOnce(Self) -> T,
        Self: Sized,
    {
        func(self)
    }
}

impl<T> FnExt for T {}

pub fn keccak256(data: impl AsRef<[u8]>) -> B256 {
    let digest: [u8; 32] = Keccak256::digest(data).into();
    B256::from(digest)
}

/// Converts a byte buffer into a chain of cells.
///
/// The buffer is split into chunks of `BYTES_PER_CELL` bytes. Every chunk is stored in its own
/// cell, which references the cell holding the following chunk. An empty buffer becomes a single
/// empty cell.
pub fn buffer_to_cell(buffer: &[u8]) -> Result<Cell, TonCellError> {
    let mut next: Option<ArcCell> = None;

    for chunk in buffer.chunks(BYTES_PER_CELL).rev() {
        let mut builder = CellBuilder::new();
        builder.store_slice(chunk)?;
        if let Some(next_cell) = next.take() {
            builder.store_reference(&next_cell)?;
        }
        next = Some(Arc::new(builder.build()?));
    }

    match next {
        Some(cell) => Ok(cell.as_ref().clone()),
        None => CellBuilder::new().build(),
    }
}

pub fn string_to_cell(value: &str) -> Result<ArcCell, TonCellError> {
    buffer_to_cell(value.as_bytes()).map(Arc::new)
}

/// Inverse of `buffer_to_cell`: reads a linear chain of byte cells back into a buffer.
pub trait CellTo {
    fn cell_to_buffer(&self) -> Vec<u8>;

    fn cell_to_string(&self) -> Result<String, TonCellError>;
}

impl CellTo for Cell {
    fn cell_to_buffer(&self) -> Vec<u8> {
        let mut buffer = self.data().to_vec();
        let mut current = self.references().first().cloned();

        while let Some(cell) = current {
            buffer.extend_from_slice(cell.data());
            current = cell.references().first().cloned();
        }

        buffer
    }

    fn cell_to_string(&self) -> Result<String, TonCellError> {
        String::from_utf8(self.cell_to_buffer())
            .map_err(|err| TonCellError::InternalError(format!("invalid utf-8 string: {err}")))
    }
}

/// Concatenates the data of a cell tree in depth-first pre-order.
pub fn flatten_cell_data(cell: &Cell) -> Vec<u8> {
    let mut out = Vec::new();
    let mut stack = vec![cell];

    while let Some(current) = stack.pop() {
        out.extend_from_slice(current.data());
        stack.extend(current.references().iter().rev().map(|child| &**child));
    }

    out
}

pub fn cell_to_boc_hex(cell: &Cell) -> Result<String, TonCellError> {
    BagOfCells::from_root(cell.clone())
        .serialize(true)
        .map(hex::encode)
}

/// Parses a single-root BoC.
pub fn cell_from_boc_hex(boc: &str) -> Result<Cell, TonCellError> {
    BagOfCells::parse_hex(boc)?
        .single_root()
        .map(|root| Cell::clone(root))
}

pub fn u256_to_biguint(value: &U256) -> BigUint {
    BigUint::from_bytes_be(&value.to_be_bytes::<32>())
}

pub fn biguint_to_u256(value: &BigUint) -> Result<U256, TonCellError> {
    U256::try_from_be_slice(&value.to_bytes_be()).ok_or_else(|| {
        TonCellError::InternalError(format!("value {value} does not fit into 256 bits"))
    })
}

pub trait CellBuilderExt {
    fn store_hash256(&mut self, value: &B256) -> Result<&mut Self, TonCellError>;

    fn store_uint256(&mut self, value: &U256) -> Result<&mut Self, TonCellError>;

    fn store_coins_u128(&mut self, value: u128) -> Result<&mut Self, TonCellError>;

    /// Stores the `Maybe ^Cell` layout: a presence bit followed by the reference if present.
    fn store_optional_ref(&mut self, cell: Option<ArcCell>) -> Result<&mut Self, TonCellError>;

    /// Stores `addr_std` for `Some` and `addr_none` for `None`.
    fn store_account(&mut self, address: Option<&Address>) -> Result<&mut Self, TonCellError>;
}

impl CellBuilderExt for CellBuilder {
    fn store_hash256(&mut self, value: &B256) -> Result<&mut Self, TonCellError> {
        self.store_slice(value.as_slice())
    }

    fn store_uint256(&mut self, value: &U256) -> Result<&mut Self, TonCellError> {
        self.store_uint(UINT256_BITS, &u256_to_biguint(value))
    }

    fn store_coins_u128(&mut self, value: u128) -> Result<&mut Self, TonCellError> {
        self.store_coins(&BigUint::from(value))
    }

    fn store_optional_ref(&mut self, cell: Option<ArcCell>) -> Result<&mut Self, TonCellError> {
        match cell {
            Some(cell) => {
                self.store_bit(true)?;
                self.store_reference(&cell)
            }
            None => self.store_bit(false),
        }
    }

    fn store_account(&mut self, address: Option<&Address>) -> Result<&mut Self, TonCellError> {
        match address {
            Some(address) => address.store(self),
            None => self.store_u8(2, 0),
        }
    }
}

pub trait CellParserExt {
    fn load_hash256(&mut self) -> Result<B256, TonCellError>;

    fn load_uint256(&mut self) -> Result<U256, TonCellError>;

    fn load_coins_u128(&mut self) -> Result<u128, TonCellError>;

    fn load_optional_ref(&mut self) -> Result<Option<ArcCell>, TonCellError>;

    fn load_account(&mut self) -> Result<Option<Address>, TonCellError>;

    /// Like `load_account`, but rejects `addr_none`.
    fn load_required_account(&mut self) -> Result<Address, TonCellError> {
        self.load_account()?
            .ok_or_else(|| TonCellError::InternalError("expected an address".to_string()))
    }
}

impl CellParserExt for CellParser<'_> {
    fn load_hash256(&mut self) -> Result<B256, TonCellError> {
        let bytes = self.load_bits(HASH_BITS)?;
        B256::try_from(bytes.as_slice())
            .map_err(|_| TonCellError::InternalError("failed to load 256-bit hash".to_string()))
    }

    fn load_uint256(&mut self) -> Result<U256, TonCellError> {
        biguint_to_u256(&self.load_uint(UINT256_BITS)?)
    }

    fn load_coins_u128(&mut self) -> Result<u128, TonCellError> {
        self.load_coins()?
            .to_u128()
            .ok_or_else(|| TonCellError::InternalError("coins do not fit into u128".to_string()))
    }

    fn load_optional_ref(&mut self) -> Result<Option<ArcCell>, TonCellError> {
        if self.load_bit()? {
            self.next_reference().map(Some)
        } else {
            Ok(None)
        }
    }

    fn load_account(&mut self) -> Result<Option<Address>, TonCellError> {
        Address::load(self)
    }
}

#[cfg(test)]
mod tests {
    use assert_ok::assert_ok;
    use rand::Rng;

    use super::*;

    const LOREM_STR: &str = "Lorem ipsum dolor sit amet ullamco ipsum. Est nulla veniam fugiat ut consectetur mollit ipsum duis nostrud ullamco cupidatat ad Lorem eu incididunt adipisicing laboris nisi. Ad mollit exercitation, culpa aute esse incididunt officia anim sint adipisicing labore anim exercitation aliquip irure id nisi tempor. Ipsum anim dolore sit incididunt ipsum nisi.  Id quis veniam occaecat est ad. Aliquip adipisicing culpa sit esse eiusmod laboris voluptate, sit. Esse amet esse occaecat laboris minim culpa officia ullamco et reprehenderit proident occaecat ullamco ipsum sunt ipsum est quis enim esse veniam est ut. Deserunt fugiat aliqua proident officia enim laboris Lorem qui dolor irure qui.  Excepteur elit est adipisicing ex in commodo eiusmod elit ea minim velit, et id aute voluptate velit fugiat culpa. Ipsum fugiat non in adipisicing eu voluptate fugiat occaecat ex enim consequat consectetur ex in. Magna reprehenderit id nisi sunt pariatur minim officia elit a";
    const LOREM_BOC: &str = "b5ee9c7241020b010003e50001c04c6f72656d20697073756d20646f6c6f722073697420616d657420756c6c616d636f20697073756d2e20457374206e756c6c612076656e69616d2066756769617420757420636f6e7365637465747572206d6f6c6c697420697073756d2064750101c06973206e6f737472756420756c6c616d636f20637570696461746174206164204c6f72656d20657520696e6369646964756e74206164697069736963696e67206c61626f726973206e6973692e204164206d6f6c6c69742065786572636974610201c074696f6e2c2063756c70612061757465206573736520696e6369646964756e74206f66666963696120616e696d2073696e74206164697069736963696e67206c61626f726520616e696d20657865726369746174696f6e20616c6971756970200301c06972757265206964206e6973692074656d706f722e20497073756d20616e696d20646f6c6f72652073697420696e6369646964756e7420697073756d206e6973692e2020496420717569732076656e69616d206f6363616563617420657374200401c061642e20416c6971756970206164697069736963696e672063756c706120736974206573736520656975736d6f64206c61626f72697320766f6c7570746174652c207369742e204573736520616d65742065737365206f63636165636174206c0501c061626f726973206d696e696d2063756c7061206f66666963696120756c6c616d636f20657420726570726568656e64657269742070726f6964656e74206f6363616563617420756c6c616d636f20697073756d2073756e7420697073756d20650601c07374207175697320656e696d20657373652076656e69616d206573742075742e204465736572756e742066756769617420616c697175612070726f6964656e74206f66666963696120656e696d206c61626f726973204c6f72656d20717569200701c0646f6c6f72206972757265207175692e202045786365707465757220656c697420657374206164697069736963696e6720657820696e20636f6d6d6f646f20656975736d6f6420656c6974206561206d696e696d2076656c69742c20657420690801c064206175746520766f6c7570746174652076656c6974206675676961742063756c70612e20497073756d20667567696174206e6f6e20696e206164697069736963696e6720657520766f6c75707461746520667567696174206f6363616563610901c07420657820656e696d20636f6e73657175617420636f6e736563746574757220657820696e2e204d61676e6120726570726568656e6465726974206964206e6973692073756e74207061726961747572206d696e696d206f66666963696120650a000a6c697420619267e790";

    #[test]
    fn should_encode_correctly() {
        let cell = buffer_to_cell(LOREM_STR.as_bytes()).unwrap();

        assert_eq!(cell_to_boc_hex(&cell).unwrap(), LOREM_BOC);
    }

    #[test]
    fn should_decode_correctly() {
        let cell = cell_from_boc_hex(LOREM_BOC).unwrap();

        assert_eq!(cell.cell_to_string().unwrap(), LOREM_STR);
    }

    #[test]
    fn should_encode_and_decode_empty_buffer() {
        let cell = buffer_to_cell(&[]).unwrap();
        let decoded = cell_from_boc_hex(&cell_to_boc_hex(&cell).unwrap()).unwrap();

        assert!(decoded.cell_to_buffer().is_empty());
    }

    #[test]
    fn flatten_visits_references_depth_first() {
        let leaf = |byte: u8| {
            let mut builder = CellBuilder::new();
            builder.store_u8(8, byte).unwrap();
            Arc::new(builder.build().unwrap())
        };

        let mut inner = CellBuilder::new();
        inner.store_u8(8, 2).unwrap();
        inner.store_reference(&leaf(3)).unwrap();

        let mut root = CellBuilder::new();
        root.store_u8(8, 1).unwrap();
        root.store_reference(&Arc::new(inner.build().unwrap())).unwrap();
        root.store_reference(&leaf(4)).unwrap();

        assert_eq!(flatten_cell_data(&root.build().unwrap()), vec![1, 2, 3, 4]);
    }

    #[test]
    fn words_and_coins_survive_a_cell() {
        let mut rng = rand::thread_rng();
        let hash = B256::from(rng.gen::<[u8; 32]>());
        let word = U256::from_be_bytes(rng.gen::<[u8; 32]>());
        let coins: u128 = rng.gen_range(0..1u128 << 120);

        let mut builder = CellBuilder::new();
        assert_ok!(builder.store_hash256(&hash));
        assert_ok!(builder.store_uint256(&word));
        assert_ok!(builder.store_coins_u128(coins));
        let cell = builder.build().unwrap();

        let mut parser = cell.parser();
        assert_eq!(parser.load_hash256().unwrap(), hash);
        assert_eq!(parser.load_uint256().unwrap(), word);
        assert_eq!(parser.load_coins_u128().unwrap(), coins);
    }

    #[test]
    fn absent_reference_differs_from_empty_reference() {
        let empty = Arc::new(CellBuilder::new().build().unwrap());

        let mut with_ref = CellBuilder::new();
        with_ref.store_optional_ref(Some(empty.clone())).unwrap();
        let mut without_ref = CellBuilder::new();
        without_ref.store_optional_ref(None).unwrap();

        let with_ref = with_ref.build().unwrap();
        let without_ref = without_ref.build().unwrap();

        assert_eq!(with_ref.parser().load_optional_ref().unwrap(), Some(empty));
        assert_eq!(without_ref.parser().load_optional_ref().unwrap(), None);
    }

    #[test]
    fn biguint_wider_than_256_bits_is_rejected() {
        let too_wide = BigUint::from(1u8) << 256usize;

        assert!(biguint_to_u256(&too_wide).is_err());
    }
}
