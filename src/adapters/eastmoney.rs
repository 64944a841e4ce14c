//! Eastmoney market data adapter.
//!
//! Talks to the public quote endpoints behind the usual A-share data
//! wrappers: the push2 list endpoint for the universe snapshot and the
//! datacenter report endpoint for per-report financial indicators. Tables
//! come back with the provider's Chinese labels; reconciliation happens in
//! the domain.

use crate::domain::error::ScreenError;
use crate::domain::table::{Table, Value};
use crate::ports::market_port::MarketDataPort;
use reqwest::blocking::Client;
use serde_json::Value as Json;
use std::time::Duration;

const UNIVERSE_URL: &str = "https://push2.eastmoney.com/api/qt/clist/get";
const INDICATOR_URL: &str = "https://datacenter-web.eastmoney.com/api/data/v1/get";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/120.0 Safari/537.36";
const PAGE_SIZE: usize = 500;
// runaway guard for a provider that keeps reporting more pages
const MAX_PAGES: usize = 40;

pub struct EastmoneyAdapter {
    client: Client,
}

impl EastmoneyAdapter {
    pub fn new() -> Result<Self, ScreenError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ScreenError::Transport {
                reason: format!("HTTP client setup failed: {e}"),
            })?;
        Ok(Self { client })
    }

    fn get_json(&self, url: &str, params: &[(&str, String)]) -> Result<Json, ScreenError> {
        let response = self
            .client
            .get(url)
            .query(params)
            .send()
            .map_err(|e| ScreenError::Transport {
                reason: format!("request to {url} failed: {e}"),
            })?;
        if !response.status().is_success() {
            return Err(ScreenError::Transport {
                reason: format!("{url} returned {}", response.status()),
            });
        }
        response.json().map_err(|e| ScreenError::Transport {
            reason: format!("invalid JSON from {url}: {e}"),
        })
    }

    fn indicator_page(&self, filter: &str, page: usize) -> Result<Json, ScreenError> {
        let params = [
            ("reportName", "RPT_DMSK_FN_MAIN".to_string()),
            (
                "columns",
                "SECURITY_CODE,REPORT_DATE,DEBT_ASSET_RATIO,NETPROFIT_YOY_RATIO,ROE_WEIGHT"
                    .to_string(),
            ),
            ("filter", filter.to_string()),
            ("sortColumns", "REPORT_DATE".to_string()),
            ("sortTypes", "1".to_string()),
            ("pageNumber", page.to_string()),
            ("pageSize", PAGE_SIZE.to_string()),
        ];
        self.get_json(INDICATOR_URL, &params)
    }
}

fn json_cell(obj: &Json, key: &str) -> Value {
    match obj.get(key) {
        Some(Json::Number(n)) => n.as_f64().map(Value::Number).unwrap_or(Value::Missing),
        Some(Json::String(s)) if !s.is_empty() && s != "-" => Value::text(s),
        _ => Value::Missing,
    }
}

/// The quote endpoint encodes symbols as bare numeric codes (f12).
fn universe_row(item: &Json) -> Vec<Value> {
    ["f12", "f14", "f2", "f3", "f9", "f23", "f20", "f21"]
        .iter()
        .map(|key| json_cell(item, key))
        .collect()
}

fn indicator_rows(body: &Json, table: &mut Table) -> Result<usize, ScreenError> {
    let Some(items) = body
        .get("result")
        .and_then(|r| r.get("data"))
        .and_then(Json::as_array)
    else {
        return Ok(0);
    };
    for item in items {
        table.push_row(vec![
            json_cell(item, "SECURITY_CODE"),
            json_cell(item, "REPORT_DATE"),
            json_cell(item, "DEBT_ASSET_RATIO"),
            json_cell(item, "NETPROFIT_YOY_RATIO"),
            json_cell(item, "ROE_WEIGHT"),
        ])?;
    }
    Ok(items.len())
}

fn indicator_table() -> Table {
    Table::new(vec![
        "代码",
        "报告期",
        "资产负债率(%)",
        "净利润同比增长率",
        "净资产收益率(%)",
    ])
}

impl MarketDataPort for EastmoneyAdapter {
    fn fetch_universe(&self) -> Result<Table, ScreenError> {
        let mut table = Table::new(vec![
            "代码",
            "名称",
            "最新价",
            "涨跌幅",
            "市盈率-动态",
            "市净率",
            "总市值",
            "流通市值",
        ]);

        for page in 1..=MAX_PAGES {
            let params = [
                ("pn", page.to_string()),
                ("pz", PAGE_SIZE.to_string()),
                ("po", "1".to_string()),
                ("np", "1".to_string()),
                ("fltt", "2".to_string()),
                ("invt", "2".to_string()),
                ("fid", "f12".to_string()),
                // all Shanghai/Shenzhen A-share boards
                ("fs", "m:0+t:6,m:0+t:80,m:1+t:2,m:1+t:23".to_string()),
                ("fields", "f2,f3,f9,f12,f14,f20,f21,f23".to_string()),
            ];
            let body = self.get_json(UNIVERSE_URL, &params)?;
            let Some(items) = body
                .get("data")
                .and_then(|d| d.get("diff"))
                .and_then(Json::as_array)
            else {
                break;
            };
            if items.is_empty() {
                break;
            }
            for item in items {
                table.push_row(universe_row(item))?;
            }
            if items.len() < PAGE_SIZE {
                break;
            }
        }

        if table.is_empty() {
            return Err(ScreenError::Transport {
                reason: "universe snapshot came back empty".to_string(),
            });
        }
        Ok(table)
    }

    fn fetch_indicators_bulk(
        &self,
        _symbols: &[String],
        start_year: i32,
    ) -> Result<Table, ScreenError> {
        // the report endpoint has no per-symbol bulk filter worth using;
        // fetch the whole report window and let the fetcher intersect
        let filter = format!("(REPORT_DATE>='{start_year}-01-01')");
        let mut table = indicator_table();
        for page in 1..=MAX_PAGES {
            let body = self.indicator_page(&filter, page)?;
            let added = indicator_rows(&body, &mut table)?;
            if added < PAGE_SIZE {
                break;
            }
        }
        Ok(table)
    }

    fn fetch_indicators(&self, symbol: &str, start_year: i32) -> Result<Table, ScreenError> {
        let filter = format!("(SECURITY_CODE=\"{symbol}\")(REPORT_DATE>='{start_year}-01-01')");
        let mut table = indicator_table();
        let body = self.indicator_page(&filter, 1)?;
        indicator_rows(&body, &mut table)?;
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn universe_row_maps_fields_and_missing_markers() {
        let item = json!({
            "f12": "600000",
            "f14": "浦发银行",
            "f2": 7.85,
            "f3": -0.51,
            "f9": "-",
            "f23": 0.45,
            "f20": 2.3e10,
            "f21": 2.3e10,
        });
        let row = universe_row(&item);
        assert_eq!(row[0], Value::text("600000"));
        assert_eq!(row[1], Value::text("浦发银行"));
        assert_eq!(row[2], Value::Number(7.85));
        // "-" marks an unavailable quote field
        assert_eq!(row[4], Value::Missing);
    }

    #[test]
    fn indicator_rows_reads_result_data() {
        let body = json!({
            "result": {
                "data": [
                    {
                        "SECURITY_CODE": "600000",
                        "REPORT_DATE": "2025-03-31 00:00:00",
                        "DEBT_ASSET_RATIO": 91.2,
                        "NETPROFIT_YOY_RATIO": 5.6,
                        "ROE_WEIGHT": 3.1,
                    }
                ]
            }
        });
        let mut table = indicator_table();
        let added = indicator_rows(&body, &mut table).unwrap();
        assert_eq!(added, 1);
        assert_eq!(table.number(0, "资产负债率(%)"), Some(91.2));
        assert_eq!(table.get(0, "代码"), Some(&Value::text("600000")));
    }

    #[test]
    fn indicator_rows_tolerates_missing_result() {
        let body = json!({"result": null});
        let mut table = indicator_table();
        assert_eq!(indicator_rows(&body, &mut table).unwrap(), 0);
        assert!(table.is_empty());
    }
}
