use super::parsing::{
    env_optional, env_or_default, parse_bool, parse_environment, parse_positive_u32, parse_u16,
    parse_u64,
};
use super::types::{
    BasicAuth, ConfigError, DatabaseSettings, LmsSettings, RetirementSettings, RuntimeSettings,
    Settings, TelemetrySettings,
};

impl Settings {
    pub(crate) fn load() -> Result<Self, ConfigError> {
        let environment =
            parse_environment(env_optional("XQUEUE_ENV").or_else(|| env_optional("ENVIRONMENT")));
        let strict_config =
            env_optional("XQUEUE_STRICT_CONFIG").map(|value| parse_bool(&value)).unwrap_or(false)
                || environment.is_production();

        let postgres_server = env_or_default("POSTGRES_SERVER", "localhost");
        let postgres_port = parse_u16("POSTGRES_PORT", env_or_default("POSTGRES_PORT", "5432"))?;
        let postgres_user = env_or_default("POSTGRES_USER", "xqueue");
        let postgres_password = env_or_default("POSTGRES_PASSWORD", "");
        let postgres_db = env_or_default("POSTGRES_DB", "xqueue");
        let database_url = env_optional("DATABASE_URL");

        let max_number_of_failures = parse_positive_u32(
            "MAX_NUMBER_OF_FAILURES",
            env_or_default("MAX_NUMBER_OF_FAILURES", "3"),
        )?;

        let request_timeout_seconds = parse_u64(
            "LMS_REQUEST_TIMEOUT_SECONDS",
            env_or_default("LMS_REQUEST_TIMEOUT_SECONDS", "5"),
        )?;
        let notify_attempts =
            parse_positive_u32("LMS_NOTIFY_ATTEMPTS", env_or_default("LMS_NOTIFY_ATTEMPTS", "5"))?;
        let basic_auth = env_optional("LMS_BASIC_AUTH_USER").map(|username| BasicAuth {
            username,
            password: env_or_default("LMS_BASIC_AUTH_PASSWORD", ""),
        });

        let log_level = env_or_default("XQUEUE_LOG_LEVEL", "info");
        let json = env_optional("XQUEUE_LOG_JSON").map(|value| parse_bool(&value)).unwrap_or(false);
        let prometheus_textfile = env_optional("PROMETHEUS_TEXTFILE").map(Into::into);

        let settings = Self {
            runtime: RuntimeSettings { environment, strict_config },
            database: DatabaseSettings {
                postgres_server,
                postgres_port,
                postgres_user,
                postgres_password,
                postgres_db,
                database_url,
            },
            retirement: RetirementSettings { max_number_of_failures },
            lms: LmsSettings { request_timeout_seconds, notify_attempts, basic_auth },
            telemetry: TelemetrySettings { log_level, json, prometheus_textfile },
        };

        settings.validate()?;

        Ok(settings)
    }

    pub(crate) fn database(&self) -> &DatabaseSettings {
        &self.database
    }

    pub(crate) fn retirement(&self) -> &RetirementSettings {
        &self.retirement
    }

    pub(crate) fn lms(&self) -> &LmsSettings {
        &self.lms
    }

    pub(crate) fn telemetry(&self) -> &TelemetrySettings {
        &self.telemetry
    }

    pub(crate) fn runtime(&self) -> &RuntimeSettings {
        &self.runtime
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.lms.request_timeout_seconds == 0 {
            return Err(ConfigError::NotPositive { field: "LMS_REQUEST_TIMEOUT_SECONDS" });
        }

        if !self.runtime.strict_config {
            return Ok(());
        }

        if self.database.database_url.is_none() && self.database.postgres_password.is_empty() {
            return Err(ConfigError::MissingSecret("POSTGRES_PASSWORD"));
        }

        if let Some(auth) = &self.lms.basic_auth {
            if auth.password.is_empty() {
                return Err(ConfigError::MissingSecret("LMS_BASIC_AUTH_PASSWORD"));
            }
        }

        Ok(())
    }
}
