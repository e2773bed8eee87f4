//! Application constants for the ANS processor
//!
//! This module contains default locations, column names, export headers,
//! sentinel values and other fixed values used throughout the processor.

// =============================================================================
// Sources and Archive Naming
// =============================================================================

/// Base URL of the ANS open-data accounting statements for 2025
pub const DEFAULT_BASE_URL: &str =
    "https://dadosabertos.ans.gov.br/FTP/PDA/demonstracoes_contabeis/2025/";

/// Quarterly archives consumed when none are configured, in processing order
pub const DEFAULT_ARCHIVES: &[&str] = &["1T2025.zip", "2T2025.zip", "3T2025.zip"];

/// Archive file extension stripped before deriving the quarter period
pub const ARCHIVE_EXTENSION: &str = ".zip";

/// Only entries with this extension are read inside an archive
pub const TEXT_TABLE_EXTENSION: &str = ".csv";

/// Year used when an archive name is too short to carry one
pub const DEFAULT_YEAR: &str = "2025";

/// Number of characters in a quarter code (e.g. "1T")
pub const PERIOD_CODE_LEN: usize = 2;

/// Number of characters in a year
pub const YEAR_LEN: usize = 4;

/// Timeout for a single archive download
pub const HTTP_TIMEOUT_SECS: u64 = 300;

// =============================================================================
// Files and Directories
// =============================================================================

/// Default registry (CADOP) location relative to the working directory
pub const DEFAULT_REGISTRY_PATH: &str = "AUX_CSV/Relatorio_cadop.csv";

/// Default output directory
pub const DEFAULT_OUTPUT_DIR: &str = "TEMP";

/// Consolidated export filename
pub const CONSOLIDATED_FILENAME: &str = "consolidado_despesas.csv";

/// Aggregated export filename
pub const AGGREGATED_FILENAME: &str = "despesas_agregadas.csv";

/// Subdirectory of the output directory where downloads are kept on request
pub const DOWNLOADS_DIR_NAME: &str = "downloads";

/// Application directory name under the user config directory
pub const CONFIG_DIR_NAME: &str = "ans-processor";

/// Configuration filename
pub const CONFIG_FILENAME: &str = "config.toml";

// =============================================================================
// Filtering
// =============================================================================

/// Expense category kept from the filings (matched case-insensitively)
pub const DEFAULT_FILTER_TEXT: &str = "Despesas com Eventos / Sinistros";

// =============================================================================
// Delimiters
// =============================================================================

/// Canonical delimiter of every input and output table
pub const CANONICAL_DELIMITER: u8 = b';';

/// Fallback header delimiter when the header has no `;`
pub const FALLBACK_DELIMITER: u8 = b',';

// =============================================================================
// Column Name Constants
// =============================================================================

/// Registry (CADOP) column names, matched case-insensitively
pub mod registry_columns {
    pub const TAX_ID: &[&str] = &["CNPJ"];
    pub const LEGAL_NAME: &[&str] = &["RAZAO_SOCIAL"];
    pub const REGISTRATION_NUMBER: &[&str] = &["REGISTRO_OPERADORA", "REGISTRO_ANS"];
    pub const OPERATOR_TYPE: &[&str] = &["MODALIDADE"];
    pub const REGION: &[&str] = &["UF"];
}

/// Filing column names, matched case-insensitively
pub mod filing_columns {
    pub const REGISTRATION_NUMBER: &[&str] = &["REG_ANS"];
    pub const DESCRIPTION: &[&str] = &["DESCRICAO"];
    pub const AMOUNT: &[&str] = &["VL_SALDO_FINAL"];
}

// =============================================================================
// Defaults and Sentinels
// =============================================================================

/// Operator type when the registry has no type column
pub const DEFAULT_OPERATOR_TYPE: &str = "N/A";

/// Region when the registry has no region column
pub const DEFAULT_REGION: &str = "BR";

/// Legal name written for rows without a registry match (or an empty name)
pub const NO_MATCH_NAME: &str = "null";

/// Operator type and region written for rows without a registry match
pub const UNKNOWN: &str = "DESCONHECIDO";

// =============================================================================
// Export Headers
// =============================================================================

/// Consolidated export header columns
pub const CONSOLIDATED_HEADER: &[&str] = &[
    "CNPJ",
    "RazaoSocial",
    "trimestre",
    "Ano",
    "ValorDespesas",
    "RegistroANS",
    "Modalidade",
    "UF",
];

/// Aggregated export header columns
pub const AGGREGATED_HEADER: &[&str] = &[
    "RazaoSocial",
    "UF",
    "TotalDespesas",
    "MediaDespesasPorTrimestre",
    "DesvioPadraoDespesas",
];

// =============================================================================
// Tax Identifier
// =============================================================================

/// Number of digits of a normalized CNPJ
pub const TAX_ID_LEN: usize = 14;
