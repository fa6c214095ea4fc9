pub mod clickhouse_repo;
pub mod profile_files;

pub use clickhouse_repo::ClickhouseRepo;
pub use profile_files::ProfileFileRepository;
