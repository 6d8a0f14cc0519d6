//! Playwright browser automation
//!
//! Each suite gets one long-lived `node` process running a generated bridge
//! script. The bridge keeps a single page open, so filters, sort order and
//! page size persist between calls exactly as they do for a user. Requests
//! and responses are line-delimited JSON on stdin/stdout.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command as TokioCommand};
use tracing::{debug, info, warn};

use gridcheck_common::{FilterType, Row, SortDirection};

use crate::driver::{DriverFactory, GridDriver};
use crate::error::{E2eError, E2eResult};
use crate::spec::GridSuite;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }

    pub fn parse(name: &str) -> Self {
        match name {
            "firefox" => Browser::Firefox,
            "webkit" => Browser::Webkit,
            _ => Browser::Chromium,
        }
    }
}

/// Configuration for Playwright
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaywrightConfig {
    /// Admin panel root; grid list URLs are relative to it
    pub base_url: String,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub browser: Browser,
    pub headless: bool,
    /// Pre-authenticated Playwright storage state
    pub storage_state: Option<PathBuf>,
    /// Per-action timeout inside the browser
    pub action_timeout_ms: u64,
    /// How long Rust waits for one bridge response
    pub response_timeout_ms: u64,
    pub node_binary: String,
    /// Directory `playwright` is resolved from
    pub project_dir: PathBuf,
}

impl Default for PlaywrightConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080/admin-dev".to_string(),
            viewport_width: 1280,
            viewport_height: 720,
            browser: Browser::Chromium,
            headless: true,
            storage_state: None,
            action_timeout_ms: 10_000,
            response_timeout_ms: 60_000,
            node_binary: "node".to_string(),
            project_dir: PathBuf::from("."),
        }
    }
}

/// Selectors for one grid page.
///
/// `{grid}` is replaced by the grid name when a suite is opened; `{row}`,
/// `{column}` and `{direction}` are filled in by the bridge per call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridLocators {
    pub list_url: String,
    pub rows: String,
    pub cell: String,
    pub grid_count: String,
    pub filter_input: String,
    pub search_button: String,
    pub reset_button: String,
    pub sort_button: String,
    pub status_cell: String,
    /// Matches inside `status_cell` only when the row is enabled
    pub status_enabled: String,
    pub pagination_limit: String,
    pub pagination_label: String,
    pub pagination_next: String,
    pub pagination_previous: String,
    pub select_all: String,
    pub bulk_menu: String,
    pub bulk_enable: String,
    pub bulk_disable: String,
    pub bulk_delete: String,
    pub confirm: Option<String>,
    pub alert: String,
    pub add_button: String,
    pub form_field: String,
    pub form_submit: String,
    pub edit_button: String,
    pub row_actions: Option<String>,
    pub delete_button: String,
}

impl Default for GridLocators {
    fn default() -> Self {
        let table = "#{grid}_grid_table";
        let panel = "#{grid}_grid_panel";
        let row = format!("{} tbody tr:nth-child({{row}})", table);
        Self {
            list_url: "/index.php?controller=Admin{grid}".to_string(),
            rows: format!("{} tbody tr:not(.empty_row)", table),
            cell: format!("{} td.column-{{column}}", row),
            grid_count: format!("{} .card-header-title", panel),
            filter_input: format!("{} [name='{{grid}}[{{column}}]']", table),
            search_button: format!("{} .grid-search-button", table),
            reset_button: format!("{} .grid-reset-button", table),
            sort_button: format!(
                "{} thead [data-sort-col-name='{{column}}'][data-sort-direction='{{direction}}']",
                table
            ),
            status_cell: format!("{} td.column-active", row),
            status_enabled: ".ps-switch input[value='1']:checked, i.action-enabled".to_string(),
            pagination_limit: format!("{} select[name='paginator_select_page_limit']", panel),
            pagination_label: format!("{} .pagination-block .col-form-label", panel),
            pagination_next: format!("{} [data-role='next-page-link']", panel),
            pagination_previous: format!("{} [data-role='previous-page-link']", panel),
            select_all: format!("{} .grid_bulk_action_select_all", table),
            bulk_menu: format!("{} button.js-bulk-actions-btn", table),
            bulk_enable: "#{grid}_grid_bulk_action_enable_selection".to_string(),
            bulk_disable: "#{grid}_grid_bulk_action_disable_selection".to_string(),
            bulk_delete: "#{grid}_grid_bulk_action_delete_selection".to_string(),
            confirm: Some("#{grid}-grid-confirm-modal button.btn-confirm-submit".to_string()),
            alert: ".alert-success .alert-text, .alert-success".to_string(),
            add_button: "#page-header-desc-configuration-add".to_string(),
            form_field: "#{grid}_{column}".to_string(),
            form_submit: "#save-button".to_string(),
            edit_button: format!("{} a.grid-edit-row-link", row),
            row_actions: Some(format!("{} a.dropdown-toggle", row)),
            delete_button: format!("{} a.grid-delete-row-link", row),
        }
    }
}

impl GridLocators {
    /// Substitute the grid name into every selector
    pub fn resolve(&self, grid: &str) -> Self {
        let sub = |s: &String| s.replace("{grid}", grid);
        Self {
            list_url: sub(&self.list_url),
            rows: sub(&self.rows),
            cell: sub(&self.cell),
            grid_count: sub(&self.grid_count),
            filter_input: sub(&self.filter_input),
            search_button: sub(&self.search_button),
            reset_button: sub(&self.reset_button),
            sort_button: sub(&self.sort_button),
            status_cell: sub(&self.status_cell),
            status_enabled: sub(&self.status_enabled),
            pagination_limit: sub(&self.pagination_limit),
            pagination_label: sub(&self.pagination_label),
            pagination_next: sub(&self.pagination_next),
            pagination_previous: sub(&self.pagination_previous),
            select_all: sub(&self.select_all),
            bulk_menu: sub(&self.bulk_menu),
            bulk_enable: sub(&self.bulk_enable),
            bulk_disable: sub(&self.bulk_disable),
            bulk_delete: sub(&self.bulk_delete),
            confirm: self.confirm.as_ref().map(sub),
            alert: sub(&self.alert),
            add_button: sub(&self.add_button),
            form_field: sub(&self.form_field),
            form_submit: sub(&self.form_submit),
            edit_button: sub(&self.edit_button),
            row_actions: self.row_actions.as_ref().map(sub),
            delete_button: sub(&self.delete_button),
        }
    }
}

/// Settings the bridge script is generated with
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BridgeSettings<'a> {
    base_url: &'a str,
    browser: &'static str,
    headless: bool,
    viewport: Viewport,
    storage_state: Option<String>,
    action_timeout_ms: u64,
    locators: &'a GridLocators,
}

#[derive(Debug, Serialize)]
struct Viewport {
    width: u32,
    height: u32,
}

#[derive(Debug, Serialize)]
struct BridgeRequest<'a> {
    id: u64,
    op: &'a str,
    args: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct BridgeResponse {
    #[serde(default)]
    id: Option<u64>,
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    value: serde_json::Value,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    ready: Option<bool>,
}

const BRIDGE_BODY: &str = r#"
const { chromium, firefox, webkit } = require(require.resolve('playwright', { paths: [process.cwd()] }));
const readline = require('readline');

const L = SETTINGS.locators;
const fill = (tpl, vars) => tpl.replace(/\{(\w+)\}/g, (m, k) => (k in vars ? String(vars[k]) : m));
const send = (msg) => process.stdout.write(JSON.stringify(msg) + '\n');

async function main() {
  const browser = await { chromium, firefox, webkit }[SETTINGS.browser].launch({ headless: SETTINGS.headless });
  const context = await browser.newContext({
    viewport: SETTINGS.viewport,
    storageState: SETTINGS.storageState || undefined,
  });
  const page = await context.newPage();
  page.setDefaultTimeout(SETTINGS.actionTimeoutMs);
  await page.goto(SETTINGS.baseUrl + L.list_url);

  const settle = () => page.waitForLoadState('networkidle');
  const text = async (selector) => (await page.locator(selector).first().innerText()).trim();
  const rowCount = () => page.locator(L.rows).count();
  const gridCount = async () => {
    const m = (await text(L.grid_count)).match(/\((\d+)\)/);
    return m ? parseInt(m[1], 10) : rowCount();
  };
  const confirmIfAsked = async () => {
    if (!L.confirm) return;
    const button = page.locator(L.confirm);
    try {
      await button.waitFor({ state: 'visible', timeout: 2000 });
    } catch (e) {
      return;
    }
    await button.click();
  };
  const bulk = async (action) => {
    await page.locator(L.select_all).click();
    await page.locator(L.bulk_menu).click();
    await page.locator(action).click();
    await confirmIfAsked();
    await settle();
    return text(L.alert);
  };
  const submitForm = async (values) => {
    for (const [column, value] of Object.entries(values)) {
      const field = page.locator(fill(L.form_field, { column }));
      const tag = await field.evaluate((e) => e.tagName.toLowerCase());
      const type = await field.getAttribute('type');
      if (tag === 'select') {
        await field.selectOption(value);
      } else if (type === 'checkbox' || type === 'radio') {
        if (['1', 'true', 'yes'].includes(String(value).toLowerCase())) await field.check();
        else await field.uncheck();
      } else {
        await field.fill(value);
      }
    }
    await page.locator(L.form_submit).click();
    await settle();
    return text(L.alert);
  };

  const ops = {
    reset: async () => {
      const button = page.locator(L.reset_button);
      if ((await button.count()) > 0 && (await button.first().isVisible())) {
        await button.first().click();
        await settle();
      }
      return gridCount();
    },
    filter: async ({ filter_type, column, value }) => {
      const input = page.locator(fill(L.filter_input, { column }));
      if (filter_type === 'select') await input.selectOption(value);
      else await input.fill(value);
      await page.locator(L.search_button).click();
      await settle();
      return null;
    },
    text: async ({ row, column }) => text(fill(L.cell, { row, column })),
    status: async ({ row }) => (await page.locator(fill(L.status_cell, { row })).locator(L.status_enabled).count()) > 0,
    count: async () => gridCount(),
    sort: async ({ column, direction }) => {
      await page.locator(fill(L.sort_button, { column, direction })).click();
      await settle();
      return null;
    },
    column: async ({ column }) => {
      const out = [];
      const n = await rowCount();
      for (let row = 1; row <= n; row++) out.push(await text(fill(L.cell, { row, column })));
      return out;
    },
    limit: async ({ size }) => {
      await page.locator(L.pagination_limit).selectOption(String(size));
      await settle();
      return text(L.pagination_label);
    },
    next: async () => {
      await page.locator(L.pagination_next).click();
      await settle();
      return text(L.pagination_label);
    },
    previous: async () => {
      await page.locator(L.pagination_previous).click();
      await settle();
      return text(L.pagination_label);
    },
    bulk_status: async ({ enabled }) => bulk(enabled ? L.bulk_enable : L.bulk_disable),
    bulk_delete: async () => bulk(L.bulk_delete),
    create: async ({ values }) => {
      await page.locator(L.add_button).click();
      await settle();
      return submitForm(values);
    },
    update: async ({ row, values }) => {
      await page.locator(fill(L.edit_button, { row })).click();
      await settle();
      return submitForm(values);
    },
    delete_row: async ({ row }) => {
      if (L.row_actions) await page.locator(fill(L.row_actions, { row })).click();
      await page.locator(fill(L.delete_button, { row })).click();
      await confirmIfAsked();
      await settle();
      return text(L.alert);
    },
  };

  send({ ready: true });

  const rl = readline.createInterface({ input: process.stdin });
  for await (const line of rl) {
    if (!line.trim()) continue;
    let req;
    try {
      req = JSON.parse(line);
    } catch (e) {
      send({ id: null, ok: false, error: 'bad request: ' + e.message });
      continue;
    }
    if (req.op === 'close') {
      send({ id: req.id, ok: true, value: null });
      break;
    }
    const op = ops[req.op];
    if (!op) {
      send({ id: req.id, ok: false, error: 'unknown op ' + req.op });
      continue;
    }
    try {
      send({ id: req.id, ok: true, value: await op(req.args || {}) });
    } catch (e) {
      send({ id: req.id, ok: false, error: e.message });
    }
  }
  await browser.close();
}

main().catch((e) => {
  send({ ready: false, error: e.message });
  process.exit(1);
});
"#;

/// Build the bridge script for one grid
pub fn build_bridge_script(config: &PlaywrightConfig, locators: &GridLocators) -> E2eResult<String> {
    let settings = BridgeSettings {
        base_url: config.base_url.trim_end_matches('/'),
        browser: config.browser.as_str(),
        headless: config.headless,
        viewport: Viewport {
            width: config.viewport_width,
            height: config.viewport_height,
        },
        storage_state: config
            .storage_state
            .as_ref()
            .map(|p| p.to_string_lossy().to_string()),
        action_timeout_ms: config.action_timeout_ms,
        locators,
    };

    let mut script = String::new();
    script.push_str("// Generated by gridcheck-e2e\n");
    script.push_str(&format!("const SETTINGS = {};\n", serde_json::to_string_pretty(&settings)?));
    script.push_str(BRIDGE_BODY);
    Ok(script)
}

/// Check if Playwright is installed
fn check_playwright_installed() -> E2eResult<()> {
    let output = Command::new("npx")
        .args(["playwright", "--version"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match output {
        Ok(status) if status.success() => Ok(()),
        _ => Err(E2eError::PlaywrightNotFound),
    }
}

/// Grid driven through a Playwright page
pub struct PlaywrightGrid {
    name: String,
    child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
    next_id: u64,
    response_timeout: Duration,
    /// Keeps the script on disk while node runs
    _script_dir: TempDir,
}

impl PlaywrightGrid {
    /// Spawn the bridge for a suite and wait until its page is loaded
    pub async fn launch(config: &PlaywrightConfig, suite: &GridSuite) -> E2eResult<Self> {
        check_playwright_installed()?;

        let locators = suite.locators.clone().unwrap_or_default().resolve(&suite.grid.name);
        let script = build_bridge_script(config, &locators)?;

        let script_dir = tempfile::tempdir()?;
        let script_path = script_dir.path().join("bridge.js");
        std::fs::write(&script_path, script)?;
        debug!("Starting Playwright bridge: {}", script_path.display());

        let mut child = TokioCommand::new(&config.node_binary)
            .arg(&script_path)
            .current_dir(&config.project_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| E2eError::Playwright(format!("failed to spawn {}: {}", config.node_binary, e)))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| E2eError::Playwright("bridge stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| E2eError::Playwright("bridge stdout unavailable".to_string()))?;

        let mut grid = Self {
            name: suite.grid.name.clone(),
            child,
            stdin,
            stdout: BufReader::new(stdout).lines(),
            next_id: 1,
            response_timeout: Duration::from_millis(config.response_timeout_ms),
            _script_dir: script_dir,
        };

        let ready = grid.read_response().await?;
        if ready.ready != Some(true) {
            grid.stop();
            return Err(E2eError::Playwright(
                ready.error.unwrap_or_else(|| "bridge failed to start".to_string()),
            ));
        }

        info!("Playwright bridge ready for grid '{}'", grid.name);
        Ok(grid)
    }

    async fn read_response(&mut self) -> E2eResult<BridgeResponse> {
        loop {
            let line = tokio::time::timeout(self.response_timeout, self.stdout.next_line())
                .await
                .map_err(|_| E2eError::Timeout(format!("Playwright bridge for '{}'", self.name)))??
                .ok_or_else(|| E2eError::Playwright("bridge exited".to_string()))?;

            match serde_json::from_str::<BridgeResponse>(&line) {
                Ok(response) => return Ok(response),
                // Page scripts may log to stdout
                Err(_) => debug!("[bridge] {}", line),
            }
        }
    }

    /// Send one request and wait for its response
    async fn call(&mut self, op: &str, args: serde_json::Value) -> E2eResult<serde_json::Value> {
        let id = self.next_id;
        self.next_id += 1;

        let mut line = serde_json::to_string(&BridgeRequest { id, op, args })?;
        line.push('\n');
        debug!("[bridge] -> {}", line.trim_end());
        self.stdin.write_all(line.as_bytes()).await?;
        self.stdin.flush().await?;

        loop {
            let response = self.read_response().await?;
            if response.id != Some(id) {
                warn!("Discarding stale bridge response {:?}", response.id);
                continue;
            }
            if !response.ok {
                return Err(E2eError::Playwright(format!(
                    "{} failed: {}",
                    op,
                    response.error.unwrap_or_else(|| "unknown error".to_string())
                )));
            }
            return Ok(response.value);
        }
    }

    async fn call_string(&mut self, op: &str, args: serde_json::Value) -> E2eResult<String> {
        let value = self.call(op, args).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn call_usize(&mut self, op: &str, args: serde_json::Value) -> E2eResult<usize> {
        let value = self.call(op, args).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Stop the bridge process
    fn stop(&mut self) {
        // Try graceful shutdown first
        #[cfg(unix)]
        {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;

            if let Some(pid) = self.child.id() {
                let _ = kill(Pid::from_raw(pid as i32), Signal::SIGTERM);
            }
        }

        // Force kill if still running
        let _ = self.child.start_kill();
    }
}

impl Drop for PlaywrightGrid {
    fn drop(&mut self) {
        self.stop();
    }
}

#[async_trait::async_trait]
impl GridDriver for PlaywrightGrid {
    fn name(&self) -> &str {
        &self.name
    }

    async fn reset_and_get_number_of_lines(&mut self) -> E2eResult<usize> {
        self.call_usize("reset", serde_json::json!({})).await
    }

    async fn filter_table(&mut self, filter_type: FilterType, column: &str, value: &str) -> E2eResult<()> {
        self.call(
            "filter",
            serde_json::json!({ "filter_type": filter_type.as_str(), "column": column, "value": value }),
        )
        .await?;
        Ok(())
    }

    async fn get_text_column(&mut self, row: usize, column: &str) -> E2eResult<String> {
        self.call_string("text", serde_json::json!({ "row": row, "column": column }))
            .await
    }

    async fn get_status(&mut self, row: usize) -> E2eResult<bool> {
        let value = self.call("status", serde_json::json!({ "row": row })).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn get_number_of_element_in_grid(&mut self) -> E2eResult<usize> {
        self.call_usize("count", serde_json::json!({})).await
    }

    async fn sort_table(&mut self, column: &str, direction: SortDirection) -> E2eResult<()> {
        self.call(
            "sort",
            serde_json::json!({ "column": column, "direction": direction.as_str() }),
        )
        .await?;
        Ok(())
    }

    async fn get_all_rows_column_content(&mut self, column: &str) -> E2eResult<Vec<String>> {
        let value = self.call("column", serde_json::json!({ "column": column })).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn select_pagination_limit(&mut self, size: usize) -> E2eResult<String> {
        self.call_string("limit", serde_json::json!({ "size": size })).await
    }

    async fn pagination_next(&mut self) -> E2eResult<String> {
        self.call_string("next", serde_json::json!({})).await
    }

    async fn pagination_previous(&mut self) -> E2eResult<String> {
        self.call_string("previous", serde_json::json!({})).await
    }

    async fn bulk_set_status(&mut self, enabled: bool) -> E2eResult<String> {
        self.call_string("bulk_status", serde_json::json!({ "enabled": enabled }))
            .await
    }

    async fn delete_with_bulk_actions(&mut self) -> E2eResult<String> {
        self.call_string("bulk_delete", serde_json::json!({})).await
    }

    async fn create_row(&mut self, draft: &Row) -> E2eResult<String> {
        self.call_string("create", serde_json::json!({ "values": draft })).await
    }

    async fn update_row(&mut self, row: usize, draft: &Row) -> E2eResult<String> {
        self.call_string("update", serde_json::json!({ "row": row, "values": draft }))
            .await
    }

    async fn delete_row(&mut self, row: usize) -> E2eResult<String> {
        self.call_string("delete_row", serde_json::json!({ "row": row })).await
    }

    async fn close(&mut self) -> E2eResult<()> {
        let closed = self.call("close", serde_json::json!({})).await;
        match tokio::time::timeout(Duration::from_secs(5), self.child.wait()).await {
            Ok(_) => {}
            Err(_) => self.stop(),
        }
        closed.map(|_| ())
    }
}

/// Launches one Playwright bridge per suite
#[derive(Debug, Clone, Default)]
pub struct PlaywrightFactory {
    pub config: PlaywrightConfig,
}

#[async_trait::async_trait]
impl DriverFactory for PlaywrightFactory {
    async fn open(&self, suite: &GridSuite) -> E2eResult<Box<dyn GridDriver>> {
        Ok(Box::new(PlaywrightGrid::launch(&self.config, suite).await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_locators_resolve_grid_name() {
        let locators = GridLocators::default().resolve("supplier");
        assert_eq!(locators.rows, "#supplier_grid_table tbody tr:not(.empty_row)");
        assert_eq!(
            locators.cell,
            "#supplier_grid_table tbody tr:nth-child({row}) td.column-{column}"
        );
        assert_eq!(locators.filter_input, "#supplier_grid_table [name='supplier[{column}]']");
        assert_eq!(
            locators.confirm.as_deref(),
            Some("#supplier-grid-confirm-modal button.btn-confirm-submit")
        );
    }

    #[test]
    fn test_locators_partial_override() {
        let yaml = "list_url: /index.php/configure/shop/contacts\nrow_actions: null\n";
        let locators: GridLocators = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(locators.list_url, "/index.php/configure/shop/contacts");
        assert!(locators.row_actions.is_none());
        assert_eq!(locators.form_submit, "#save-button");
    }

    #[test]
    fn test_bridge_script_embeds_settings() {
        let config = PlaywrightConfig {
            base_url: "http://shop.test/admin-dev/".to_string(),
            browser: Browser::Firefox,
            storage_state: Some(PathBuf::from("/tmp/state.json")),
            ..Default::default()
        };
        let locators = GridLocators::default().resolve("currency");
        let script = build_bridge_script(&config, &locators).unwrap();

        assert!(script.starts_with("// Generated by gridcheck-e2e\nconst SETTINGS = {"));
        assert!(script.contains(r#""baseUrl": "http://shop.test/admin-dev""#));
        assert!(script.contains(r#""browser": "firefox""#));
        assert!(script.contains(r#""storageState": "/tmp/state.json""#));
        assert!(script.contains("#currency_grid_table"));
        assert!(script.contains("for await (const line of rl)"));
    }

    #[test]
    fn test_bridge_script_escapes_quotes() {
        let mut locators = GridLocators::default();
        locators.alert = r#"div[data-msg="ok"]"#.to_string();
        let script = build_bridge_script(&PlaywrightConfig::default(), &locators).unwrap();
        assert!(script.contains(r#""alert": "div[data-msg=\"ok\"]""#));
    }

    #[test]
    fn test_request_and_response_shapes() {
        let request = BridgeRequest {
            id: 7,
            op: "filter",
            args: serde_json::json!({ "column": "name", "value": "todelete" }),
        };
        let line = serde_json::to_string(&request).unwrap();
        assert_eq!(
            line,
            r#"{"id":7,"op":"filter","args":{"column":"name","value":"todelete"}}"#
        );

        let ok: BridgeResponse = serde_json::from_str(r#"{"id":7,"ok":true,"value":["a","b"]}"#).unwrap();
        assert_eq!(ok.id, Some(7));
        assert!(ok.ok);
        assert_eq!(ok.value, serde_json::json!(["a", "b"]));

        let ready: BridgeResponse = serde_json::from_str(r#"{"ready":true}"#).unwrap();
        assert_eq!(ready.ready, Some(true));
        assert!(!ready.ok);
    }

    #[test_case("chromium" => Browser::Chromium ; "chromium")]
    #[test_case("firefox" => Browser::Firefox ; "firefox")]
    #[test_case("webkit" => Browser::Webkit ; "webkit")]
    #[test_case("anything" => Browser::Chromium ; "unknown falls back")]
    fn test_browser_parse(name: &str) -> Browser {
        Browser::parse(name)
    }
}
