//! Batch pipeline services and their external collaborators

pub mod batch_importer;
pub mod bulk_dispatcher;
pub mod csv_decoder;
pub mod evolution_client;
pub mod message_gateway;
pub mod record_store;
pub mod result_aggregator;
pub mod row_validator;
pub mod supabase_client;

pub use batch_importer::{BatchImporter, ImportError, InvalidRow, ValidationFailure};
pub use bulk_dispatcher::BulkDispatcher;
pub use csv_decoder::{decode_rows, CsvDecodeError};
pub use evolution_client::EvolutionClient;
pub use message_gateway::{GatewayError, MessageGateway};
pub use record_store::{CampaignDirectory, CreateOutcome, RecordStore, StoreReadError};
pub use result_aggregator::{run_indexed, AggregateError, ItemOutcome, ResultAggregator};
pub use row_validator::{validate_row, validate_rows};
pub use supabase_client::{SupabaseClient, SupabaseTable};
