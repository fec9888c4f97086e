//! The static command catalog.
//!
//! Entries are declared once as `'static` data with both translations and
//! materialized into [`CommandDefinition`]s per locale on first use.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use rconsole_types::{
    BodyBinding, BodyEncoding, CommandDefinition, CommandSubset, FieldConstraint, InvocationMethod, Locale, LocalizedText,
    ParamKind, ParameterSpec, RemoteInvocation, SelectOption, ValidationSchema,
};

type T = LocalizedText;

#[derive(Clone, Copy)]
enum KindEntry {
    Text,
    Secret,
    Number,
    Boolean,
    Choice(&'static [(&'static str, LocalizedText)]),
}

#[derive(Clone, Copy)]
struct ParamEntry {
    id: &'static str,
    name: LocalizedText,
    kind: KindEntry,
    optional: bool,
    placeholder: Option<&'static str>,
    /// Body key; differs from `id` for the volume-license commands
    body_key: &'static str,
    encoding: BodyEncoding,
}

impl ParamEntry {
    const fn new(id: &'static str, name: LocalizedText, kind: KindEntry) -> Self {
        Self {
            id,
            name,
            kind,
            optional: false,
            placeholder: None,
            body_key: id,
            encoding: BodyEncoding::Scalar,
        }
    }

    const fn text(id: &'static str, name: LocalizedText) -> Self {
        Self::new(id, name, KindEntry::Text)
    }

    const fn secret(id: &'static str, name: LocalizedText) -> Self {
        Self::new(id, name, KindEntry::Secret)
    }

    const fn number(id: &'static str, name: LocalizedText) -> Self {
        Self::new(id, name, KindEntry::Number)
    }

    const fn boolean(id: &'static str, name: LocalizedText) -> Self {
        Self::new(id, name, KindEntry::Boolean)
    }

    const fn choice(id: &'static str, name: LocalizedText, options: &'static [(&'static str, LocalizedText)]) -> Self {
        Self::new(id, name, KindEntry::Choice(options))
    }

    const fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    const fn placeholder(mut self, placeholder: &'static str) -> Self {
        self.placeholder = Some(placeholder);
        self
    }

    const fn sent_as(mut self, body_key: &'static str) -> Self {
        self.body_key = body_key;
        self
    }

    const fn comma_list(mut self) -> Self {
        self.encoding = BodyEncoding::CommaList;
        self
    }

    fn materialize(&self, locale: Locale) -> ParameterSpec {
        let kind = match self.kind {
            KindEntry::Text => ParamKind::Text,
            KindEntry::Secret => ParamKind::Secret,
            KindEntry::Number => ParamKind::Number,
            KindEntry::Boolean => ParamKind::Boolean,
            KindEntry::Choice(options) => ParamKind::Enumeration(
                options
                    .iter()
                    .map(|(id, label)| SelectOption::new(*id, label.get(locale)))
                    .collect(),
            ),
        };
        ParameterSpec {
            id: self.id.to_string(),
            name: self.name.get(locale).to_string(),
            kind,
            optional: self.optional,
            placeholder: self.placeholder.map(str::to_string),
        }
    }

    fn binding(&self) -> BodyBinding {
        BodyBinding {
            key: self.body_key.to_string(),
            encoding: self.encoding,
        }
    }
}

#[derive(Clone, Copy)]
enum SchemaEntry {
    None,
    VolumeInstall,
    VolumeKey,
    VolumeUpdate,
}

impl SchemaEntry {
    fn build(self) -> Option<ValidationSchema> {
        let license = || FieldConstraint::text().length(1, 32);
        let users = || FieldConstraint::number().integer().range(1.0, 100.0);
        match self {
            Self::None => None,
            Self::VolumeInstall => Some(
                ValidationSchema::new()
                    .field("licenseKey", license())
                    .field("users", users())
                    .field("edition", FieldConstraint::text().length(1, 32))
                    .field("supportYears", FieldConstraint::number().integer().range(1.0, 10.0)),
            ),
            Self::VolumeKey => Some(ValidationSchema::new().field("licenseKey", license())),
            Self::VolumeUpdate => Some(
                ValidationSchema::new()
                    .field("licenseKey", license())
                    .field("users", users()),
            ),
        }
    }
}

struct CommandEntry {
    id: &'static str,
    name: LocalizedText,
    description: LocalizedText,
    method: InvocationMethod,
    params: &'static [ParamEntry],
    schema: SchemaEntry,
}

impl CommandEntry {
    fn materialize(&self, locale: Locale) -> CommandDefinition {
        CommandDefinition {
            id: self.id.to_string(),
            name: self.name.get(locale).to_string(),
            description: self.description.get(locale).to_string(),
            params: self.params.iter().map(|param| param.materialize(locale)).collect(),
            schema: self.schema.build(),
            invocation: RemoteInvocation {
                method: self.method,
                path: format!("/commands/{}/", self.id),
                bindings: self.params.iter().map(ParamEntry::binding).collect(),
            },
        }
    }
}

const SILENT: ParamEntry = ParamEntry::boolean("silent", T::new("Silent mode", "Modo silencioso")).optional();
const LICENSE_KEY: ParamEntry = ParamEntry::text("licenseKey", T::new("License key", "Clave de licencia"))
    .placeholder("XXXXX-XXXXX-XXXXX-XXXXX-XXXXX")
    .sent_as("licensekey");
const LOGIN: ParamEntry = ParamEntry::text("login", T::new("Login", "Usuario")).optional();
const EDITION_OPTIONS: &[(&str, LocalizedText)] = &[
    ("Enterprise", T::new("Enterprise", "Enterprise")),
    ("Standard", T::new("Standard", "Standard")),
    ("Advanced", T::new("Advanced", "Advanced")),
];

static COMMANDS: &[CommandEntry] = &[
    CommandEntry {
        id: "backup_data",
        name: T::new("Backup", "Copia de seguridad"),
        description: T::new(
            "Backs up the Remote Access data and settings.",
            "Hace una copia de seguridad de los datos y configuraciones de Remote Access.",
        ),
        method: InvocationMethod::Post,
        params: &[
            ParamEntry::text("optionalPath", T::new("Backup folder", "Carpeta de respaldo"))
                .optional()
                .placeholder("C:\\Backups\\"),
            SILENT,
        ],
        schema: SchemaEntry::None,
    },
    CommandEntry {
        id: "restore_data",
        name: T::new("Restore", "Restaurar"),
        description: T::new(
            "Restores Remote Access data and settings from a backup.",
            "Restaura datos y configuraciones de Remote Access desde un respaldo.",
        ),
        method: InvocationMethod::Put,
        params: &[
            ParamEntry::text("restorePath", T::new("Backup folder", "Carpeta de respaldo")).placeholder("C:\\Backups\\"),
            SILENT,
        ],
        schema: SchemaEntry::None,
    },
    CommandEntry {
        id: "web_server",
        name: T::new("Web server", "Servidor web"),
        description: T::new(
            "Starts, stops or restarts the web server.",
            "Inicia, detiene o reinicia el servidor web.",
        ),
        method: InvocationMethod::Post,
        params: &[ParamEntry::choice(
            "command",
            T::new("Action", "Acción"),
            &[
                ("start", T::new("Start", "Iniciar")),
                ("stop", T::new("Stop", "Detener")),
                ("restart", T::new("Restart", "Reiniciar")),
            ],
        )],
        schema: SchemaEntry::None,
    },
    CommandEntry {
        id: "update",
        name: T::new("Update Remote Access", "Actualizar Remote Access"),
        description: T::new(
            "Updates Remote Access and Advanced Security.",
            "Actualiza Remote Access y Advanced Security.",
        ),
        method: InvocationMethod::Put,
        params: &[],
        schema: SchemaEntry::None,
    },
    CommandEntry {
        id: "windows_compatibility",
        name: T::new("Apply Windows compatibility", "Aplicar compatibilidad de Windows"),
        description: T::new(
            "Applies the Windows compatibility updates.",
            "Aplica las actualizaciones de compatibilidad de Windows.",
        ),
        method: InvocationMethod::Put,
        params: &[],
        schema: SchemaEntry::None,
    },
    CommandEntry {
        id: "install_printer",
        name: T::new("Install Universal Printer", "Instalar Impresora Universal"),
        description: T::new("Installs the Universal Printer.", "Instala la Impresora Universal."),
        method: InvocationMethod::Post,
        params: &[],
        schema: SchemaEntry::None,
    },
    CommandEntry {
        id: "remove_printer",
        name: T::new("Remove Universal Printer", "Remover Impresora Universal"),
        description: T::new("Uninstalls the Universal Printer.", "Desinstala la Impresora Universal."),
        method: InvocationMethod::Delete,
        params: &[],
        schema: SchemaEntry::None,
    },
    CommandEntry {
        id: "proxy_set",
        name: T::new("Configure proxy", "Configurar proxy"),
        description: T::new(
            "Configures the proxy server used for Internet access.",
            "Configura el servidor proxy para el acceso a Internet.",
        ),
        method: InvocationMethod::Post,
        params: &[
            ParamEntry::choice(
                "command",
                T::new("Action", "Acción"),
                &[
                    ("set", T::new("Set", "Establecer")),
                    ("remove", T::new("Remove", "Quitar")),
                ],
            ),
            ParamEntry::text("params", T::new("Proxy settings", "Parámetros del proxy"))
                .optional()
                .placeholder("-host proxy.local -port 8080"),
        ],
        schema: SchemaEntry::None,
    },
    CommandEntry {
        id: "web_credentials",
        name: T::new("Open web credentials", "Abrir credenciales web"),
        description: T::new("Opens the Web Credentials manager.", "Abre la interfaz de Credenciales Web."),
        method: InvocationMethod::Post,
        params: &[],
        schema: SchemaEntry::None,
    },
    CommandEntry {
        id: "web_credentials_add",
        name: T::new("Create web credentials", "Crear credenciales web"),
        description: T::new(
            "Creates web credentials mapped to a Windows account.",
            "Crea credenciales web asociadas a una cuenta de Windows.",
        ),
        method: InvocationMethod::Post,
        params: &[
            ParamEntry::text("webLogin", T::new("Web login", "Login web")),
            ParamEntry::secret("webPassword", T::new("Web password", "Contraseña web")),
            ParamEntry::text("windowsLogin", T::new("Windows login", "Login Windows")),
            ParamEntry::secret("windowsPassword", T::new("Windows password", "Contraseña Windows")),
            ParamEntry::number(
                "maximumConcurrentSessions",
                T::new("Maximum concurrent sessions", "Máximo de sesiones concurrentes"),
            )
            .optional(),
        ],
        schema: SchemaEntry::None,
    },
    CommandEntry {
        id: "web_credentials_remove",
        name: T::new("Remove web credentials", "Quitar credenciales web"),
        description: T::new("Deletes existing web credentials.", "Elimina una credencial web existente."),
        method: InvocationMethod::Delete,
        params: &[ParamEntry::text("webLogin", T::new("Web login", "Login web"))],
        schema: SchemaEntry::None,
    },
    CommandEntry {
        id: "session_manager",
        name: T::new("Open session manager", "Abrir administrador de sesiones"),
        description: T::new("Opens the session manager.", "Abre el administrador de sesiones."),
        method: InvocationMethod::Post,
        params: &[],
        schema: SchemaEntry::None,
    },
    CommandEntry {
        id: "farm_sessions_monitor",
        name: T::new("Open farm sessions monitor", "Abrir monitor de sesiones"),
        description: T::new(
            "Opens the farm manager's sessions monitor.",
            "Abre el monitor de sesiones del administrador de granjas.",
        ),
        method: InvocationMethod::Post,
        params: &[],
        schema: SchemaEntry::None,
    },
    CommandEntry {
        id: "farm_loadbalancing",
        name: T::new("Open load balancing manager", "Abrir administrador de balanceo de carga"),
        description: T::new(
            "Opens the farm manager's load balancing settings.",
            "Abre el administrador de balanceo de carga del administrador de granjas.",
        ),
        method: InvocationMethod::Post,
        params: &[],
        schema: SchemaEntry::None,
    },
    CommandEntry {
        id: "system_audit",
        name: T::new("Run system audit", "Correr una auditoría de sistema"),
        description: T::new("Runs a system audit.", "Ejecuta una auditoría del sistema."),
        method: InvocationMethod::Post,
        params: &[],
        schema: SchemaEntry::None,
    },
    CommandEntry {
        id: "activate_license",
        name: T::new("Activate license", "Activación de licencia"),
        description: T::new(
            "Activates Remote Access with a license file.",
            "Activa la licencia de Remote Access usando un archivo de licencia.",
        ),
        method: InvocationMethod::Post,
        params: &[ParamEntry::text("licensePath", T::new("License file path", "Ruta de licencia"))
            .placeholder("C:\\licenses\\license.lic")],
        schema: SchemaEntry::None,
    },
    CommandEntry {
        id: "license_reset",
        name: T::new("Reset cloned machine license", "Resetear licencia de máquina virtual clonada"),
        description: T::new(
            "Initializes the licenses on a cloned server.",
            "Inicializa las licencias en un servidor clonado.",
        ),
        method: InvocationMethod::Post,
        params: &[],
        schema: SchemaEntry::None,
    },
    CommandEntry {
        id: "vl_activate",
        name: T::new("Install volume license server", "Instalar servidor de licencias por volumen"),
        description: T::new(
            "Installs a volume license server in a single step.",
            "Instala un servidor de licencias por volumen en un solo paso.",
        ),
        method: InvocationMethod::Post,
        params: &[
            LICENSE_KEY,
            ParamEntry::number("users", T::new("Number of users", "Número de usuarios")).placeholder("10"),
            ParamEntry::choice("edition", T::new("Edition", "Edición"), EDITION_OPTIONS).placeholder("Enterprise"),
            ParamEntry::number("supportYears", T::new("Support years", "Años de soporte"))
                .placeholder("1")
                .sent_as("supportyears"),
            ParamEntry::text("comments", T::new("Comments", "Comentarios")).optional(),
        ],
        schema: SchemaEntry::VolumeInstall,
    },
    CommandEntry {
        id: "vl_enable",
        name: T::new("Enable volume license", "Activar licencia de volumen"),
        description: T::new("Enables a volume license.", "Activa una licencia por volumen."),
        method: InvocationMethod::Post,
        params: &[LICENSE_KEY],
        schema: SchemaEntry::VolumeKey,
    },
    CommandEntry {
        id: "vl_disable",
        name: T::new("Disable volume license", "Deshabilitar licencia de volumen"),
        description: T::new("Disables a volume license.", "Deshabilita una licencia por volumen."),
        method: InvocationMethod::Post,
        params: &[LICENSE_KEY],
        schema: SchemaEntry::VolumeKey,
    },
    CommandEntry {
        id: "vl_update",
        name: T::new("Update volume license", "Actualizar licencia de volumen"),
        description: T::new(
            "Updates the number of users of a volume license.",
            "Actualiza los usuarios de una licencia por volumen.",
        ),
        method: InvocationMethod::Post,
        params: &[
            LICENSE_KEY,
            ParamEntry::number("users", T::new("Users", "Usuarios")).placeholder("10"),
        ],
        schema: SchemaEntry::VolumeUpdate,
    },
    CommandEntry {
        id: "vl_credits_license",
        name: T::new("Show license credits", "Desplegar créditos de licencia"),
        description: T::new(
            "Shows the license credits left on a volume license key.",
            "Muestra los créditos de licencia restantes asociados con una clave de licencia por volumen.",
        ),
        method: InvocationMethod::Post,
        params: &[
            LICENSE_KEY,
            LOGIN,
            ParamEntry::choice("edition", T::new("Edition", "Edición"), EDITION_OPTIONS).optional(),
            SILENT,
        ],
        schema: SchemaEntry::VolumeKey,
    },
    CommandEntry {
        id: "vl_credits_support",
        name: T::new("Show support credits", "Desplegar créditos de soporte"),
        description: T::new(
            "Shows the support credits left on a volume license key.",
            "Muestra los créditos de soporte restantes asociados con una clave de licencia por volumen.",
        ),
        method: InvocationMethod::Post,
        params: &[
            LICENSE_KEY,
            LOGIN,
            ParamEntry::choice("edition", T::new("Edition", "Edición"), EDITION_OPTIONS).optional(),
            SILENT,
        ],
        schema: SchemaEntry::VolumeKey,
    },
    CommandEntry {
        id: "2fa_resetuser",
        name: T::new("2FA - Reset users", "2FA - Resetear usuarios"),
        description: T::new("Resets 2FA for the given users.", "Resetea la configuración 2FA de los usuarios."),
        method: InvocationMethod::Post,
        params: &[ParamEntry::text("users", T::new("Users (comma separated)", "Usuarios (separados por comas)"))
            .placeholder("DOMAIN\\user1,DOMAIN\\user2")
            .comma_list()],
        schema: SchemaEntry::None,
    },
    CommandEntry {
        id: "2fa_addusers",
        name: T::new("2FA - Add users", "2FA - Añadir usuarios"),
        description: T::new("Adds several 2FA users.", "Añade varios usuarios de 2FA."),
        method: InvocationMethod::Post,
        params: &[ParamEntry::text("userInfos", T::new("Users (comma separated)", "Usuarios (separados por comas)"))
            .placeholder("DOMAIN\\user;email;user@example.com")
            .comma_list()],
        schema: SchemaEntry::None,
    },
    CommandEntry {
        id: "2fa_addgroups",
        name: T::new("2FA - Add groups", "2FA - Añadir grupos"),
        description: T::new("Adds several 2FA groups.", "Añade varios grupos de 2FA."),
        method: InvocationMethod::Post,
        params: &[ParamEntry::text("groups", T::new("Groups (comma separated)", "Grupos (separados por comas)"))
            .placeholder("DOMAIN\\group1,DOMAIN\\group2")
            .comma_list()],
        schema: SchemaEntry::None,
    },
    CommandEntry {
        id: "2fa_getusers",
        name: T::new("2FA - List users", "2FA - Listar usuarios"),
        description: T::new(
            "Lists every user and group configured in the 2FA console.",
            "Obtiene la lista de usuarios y grupos configurados en la consola de 2FA.",
        ),
        method: InvocationMethod::Get,
        params: &[],
        schema: SchemaEntry::None,
    },
    CommandEntry {
        id: "2fa_deleteuser",
        name: T::new("2FA - Delete user", "2FA - Eliminar usuario"),
        description: T::new("Removes a 2FA user or group.", "Elimina un usuario o grupo de 2FA."),
        method: InvocationMethod::Delete,
        params: &[
            ParamEntry::text("domainName", T::new("Domain name", "Nombre de dominio")).placeholder("DOMAIN\\user"),
            ParamEntry::choice(
                "userType",
                T::new("Type", "Tipo"),
                &[("user", T::new("User", "Usuario")), ("group", T::new("Group", "Grupo"))],
            ),
        ],
        schema: SchemaEntry::None,
    },
    CommandEntry {
        id: "windowscredential_addorupdate",
        name: T::new("Add or update Windows credentials", "Añadir o actualizar credenciales de Windows"),
        description: T::new(
            "Stores Windows credentials, one at a time or from a CSV file.",
            "Guarda credenciales de Windows, una a una o desde un archivo CSV.",
        ),
        method: InvocationMethod::Post,
        params: &[
            ParamEntry::text("csvFilePath", T::new("CSV file path", "Ruta del archivo CSV"))
                .optional()
                .placeholder("C:\\creds\\credentials.csv"),
            ParamEntry::text("target", T::new("Target", "Destino")).optional(),
            ParamEntry::text("username", T::new("Username", "Usuario")).optional(),
            ParamEntry::secret("password", T::new("Password", "Contraseña")).optional(),
        ],
        schema: SchemaEntry::None,
    },
    CommandEntry {
        id: "windowscredential_remove",
        name: T::new("Remove Windows credentials", "Quitar credenciales de Windows"),
        description: T::new(
            "Removes stored Windows credentials.",
            "Elimina credenciales de Windows guardadas.",
        ),
        method: InvocationMethod::Delete,
        params: &[
            ParamEntry::text("csvFilePath", T::new("CSV file path", "Ruta del archivo CSV"))
                .optional()
                .placeholder("C:\\creds\\credentials.csv"),
            ParamEntry::text("username", T::new("Username", "Usuario")).optional(),
        ],
        schema: SchemaEntry::None,
    },
];

static MATERIALIZED: Lazy<HashMap<Locale, Vec<Arc<CommandDefinition>>>> = Lazy::new(|| {
    Locale::ALL
        .iter()
        .map(|&locale| {
            let commands = COMMANDS
                .iter()
                .map(|entry| Arc::new(entry.materialize(locale)))
                .collect();
            (locale, commands)
        })
        .collect()
});

/// Read-only view over the process-wide command table.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandCatalog {
    locale: Locale,
}

impl CommandCatalog {
    /// A catalog whose [`CommandCatalog::get`] answers in `locale`.
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Every command in catalog order.
    pub fn list(&self, locale: Locale) -> Vec<Arc<CommandDefinition>> {
        materialized(locale).to_vec()
    }

    pub fn get(&self, id: &str) -> Option<Arc<CommandDefinition>> {
        self.get_in(id, self.locale)
    }

    pub fn get_in(&self, id: &str, locale: Locale) -> Option<Arc<CommandDefinition>> {
        materialized(locale).iter().find(|command| command.id == id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        COMMANDS.iter().any(|entry| entry.id == id)
    }

    /// Commands exposed by `subset`, in catalog order. Unknown ids are skipped.
    pub fn filter_by_subset(&self, subset: &CommandSubset, locale: Locale) -> Vec<Arc<CommandDefinition>> {
        materialized(locale)
            .iter()
            .filter(|command| subset.contains(&command.id))
            .cloned()
            .collect()
    }
}

fn materialized(locale: Locale) -> &'static [Arc<CommandDefinition>] {
    MATERIALIZED.get(&locale).map(Vec::as_slice).unwrap_or_default()
}

/// Identifiers of every catalog command, in catalog order.
pub fn command_ids() -> impl Iterator<Item = &'static str> {
    COMMANDS.iter().map(|entry| entry.id)
}
