mod bitmap;
mod cursor;
mod row;
mod scalar;


pub use bitmap::{BitMask, storage_len};
pub use cursor::ByteCursor;
pub use row::{
    Encoded, decode_column, decode_row, decode_row_into, decode_timestamps, encode_column,
    encode_row, encode_timestamps,
};
pub(crate) use row::{encode_column_at, encode_row_at};
pub use scalar::{decode_value, decode_values, encode_value};
