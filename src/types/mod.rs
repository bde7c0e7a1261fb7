pub mod dto;

pub use dto::{
    ColumnType, GenericResponse, RowUpdateRequest, TableDataResponse, UpdateRowResponse,
};
