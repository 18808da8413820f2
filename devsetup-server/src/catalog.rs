//! Built-in tool catalog
//!
//! The installable tools and tool sets known to the server. They are upserted
//! on every startup, so edits here reach existing databases while the
//! installed flag of a tool is preserved.

use sqlx::PgPool;

use crate::repository::tool_repository;

/// Catalog entry for one installable tool
#[derive(Debug, Clone, Copy)]
pub struct ToolSeed {
    pub name: &'static str,
    pub display_name: &'static str,
    pub category: &'static str,
    pub description: &'static str,
    /// Relative to the scripts directory
    pub script_path: &'static str,
    pub icon: &'static str,
}

/// Catalog entry for a named group of tools
#[derive(Debug, Clone, Copy)]
pub struct ToolSetSeed {
    pub name: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
    pub tools: &'static [&'static str],
}

const SYSTEM: &str = "System & Build Tools";
const NODE: &str = "Node.js & JavaScript";
const PYTHON: &str = "Python Tools";
const DEV: &str = "Development Tools";
const DATABASES: &str = "Databases";
const CLOUD: &str = "Cloud Services";
const AI: &str = "AI/ML Tools";

const fn tool(
    name: &'static str,
    display_name: &'static str,
    category: &'static str,
    description: &'static str,
    script_path: &'static str,
    icon: &'static str,
) -> ToolSeed {
    ToolSeed {
        name,
        display_name,
        category,
        description,
        script_path,
        icon,
    }
}

pub const TOOLS: &[ToolSeed] = &[
    // System tools
    tool("apt-packages", "Essential APT Packages", SYSTEM, "Core system packages and build tools", "system/01-apt-packages.sh", "mdi-package"),
    tool("homebrew", "Homebrew", SYSTEM, "Package manager for Linux", "system/02-homebrew.sh", "mdi-beer"),
    // Node.js
    tool("nvm", "NVM & Node.js", NODE, "Node Version Manager and Node.js", "nodejs/01-nvm-node.sh", "mdi-nodejs"),
    tool("yarn", "Yarn", NODE, "Fast, reliable JavaScript package manager", "nodejs/02-package-managers.sh", "mdi-package-variant"),
    tool("pnpm", "pnpm", NODE, "Fast, disk space efficient package manager", "nodejs/02-package-managers.sh", "mdi-package-variant-closed"),
    tool("claude-code", "Claude Code", AI, "Anthropic's official CLI for Claude", "nodejs/03-global-tools.sh", "mdi-robot"),
    tool("vite", "Vite", NODE, "Next generation frontend tooling", "nodejs/03-global-tools.sh", "mdi-lightning-bolt"),
    tool("tailwindcss", "Tailwind CSS", NODE, "Utility-first CSS framework", "nodejs/04-frontend-frameworks.sh", "mdi-tailwind"),
    tool("vuetify", "Vuetify", NODE, "Material Design component framework for Vue.js", "nodejs/04-frontend-frameworks.sh", "mdi-vuetify"),
    tool("mui", "Material-UI", NODE, "React components for Material Design", "nodejs/04-frontend-frameworks.sh", "mdi-material-ui"),
    // Python
    tool("python", "Python & pip", PYTHON, "Python runtime and package manager", "python/01-python-pip.sh", "mdi-language-python"),
    tool("pipx", "pipx", PYTHON, "Install Python apps in isolated environments", "python/02-pipx-tools.sh", "mdi-package-variant-closed"),
    tool("jupyter", "Jupyter", PYTHON, "Interactive computing notebooks", "python/03-data-science.sh", "mdi-notebook"),
    // Development tools
    tool("vscode", "VS Code", DEV, "Visual Studio Code editor", "dev-tools/01-vscode.sh", "mdi-microsoft-visual-studio-code"),
    tool("git", "Git", DEV, "Version control system", "dev-tools/02-git.sh", "mdi-git"),
    tool("github-cli", "GitHub CLI", DEV, "GitHub command line tool", "dev-tools/03-github-cli.sh", "mdi-github"),
    // Databases
    tool("docker", "Docker", CLOUD, "Container platform", "cloud-services/01-docker.sh", "mdi-docker"),
    tool("postgresql", "PostgreSQL", DATABASES, "PostgreSQL database in Docker", "databases/01-postgresql.sh", "mdi-database"),
    tool("mysql", "MySQL", DATABASES, "MySQL database in Docker", "databases/02-mysql.sh", "mdi-database"),
    tool("mongodb", "MongoDB", DATABASES, "MongoDB NoSQL database in Docker", "databases/03-mongodb.sh", "mdi-leaf"),
    tool("redis", "Redis", DATABASES, "Redis in-memory data store", "databases/04-redis.sh", "mdi-database-outline"),
    // Cloud services
    tool("aws-cli", "AWS CLI", CLOUD, "Amazon Web Services CLI", "cloud-services/02-aws-cli.sh", "mdi-aws"),
    tool("gcloud", "Google Cloud SDK", CLOUD, "Google Cloud Platform tools", "cloud-services/03-gcloud.sh", "mdi-google-cloud"),
    tool("azure-cli", "Azure CLI", CLOUD, "Microsoft Azure command line", "cloud-services/04-azure-cli.sh", "mdi-microsoft-azure"),
    // AI tools
    tool("ollama", "Ollama", AI, "Run large language models locally", "ai-tools/01-ollama.sh", "mdi-robot"),
    tool("mcp-servers", "MCP Servers", AI, "Model Context Protocol servers", "ai-tools/02-mcp-servers.sh", "mdi-server"),
];

pub const TOOL_SETS: &[ToolSetSeed] = &[
    ToolSetSeed {
        name: "essentials",
        display_name: "Essentials",
        description: "Build tools, Git and an editor",
        tools: &["apt-packages", "git", "github-cli", "vscode"],
    },
    ToolSetSeed {
        name: "frontend",
        display_name: "Frontend Development",
        description: "Node.js toolchain with common UI frameworks",
        tools: &["nvm", "yarn", "pnpm", "vite", "tailwindcss", "vuetify", "mui"],
    },
    ToolSetSeed {
        name: "python-data",
        display_name: "Python & Data Science",
        description: "Python runtime, pipx and Jupyter",
        tools: &["python", "pipx", "jupyter"],
    },
    ToolSetSeed {
        name: "databases",
        display_name: "Databases",
        description: "Docker with containerized database servers",
        tools: &["docker", "postgresql", "mysql", "mongodb", "redis"],
    },
    ToolSetSeed {
        name: "cloud",
        display_name: "Cloud CLIs",
        description: "Command line tools for the major cloud providers",
        tools: &["aws-cli", "gcloud", "azure-cli"],
    },
    ToolSetSeed {
        name: "ai",
        display_name: "AI Development",
        description: "Local models and AI coding assistants",
        tools: &["nvm", "claude-code", "ollama", "mcp-servers"],
    },
];

/// Upserts the built-in tools and tool sets
pub async fn seed(pool: &PgPool) -> Result<(), sqlx::Error> {
    for tool in TOOLS {
        tool_repository::upsert_tool(pool, tool).await?;
    }

    for set in TOOL_SETS {
        tool_repository::upsert_tool_set(pool, set).await?;
    }

    tracing::info!(
        "Loaded {} tool definitions and {} tool sets",
        TOOLS.len(),
        TOOL_SETS.len()
    );
    Ok(())
}
