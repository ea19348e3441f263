//! Scripted stand-ins for the browser page and the OCR engine.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use image::{DynamicImage, GrayImage, ImageFormat, Luma};

use senescyt_lookup::config::{DomContract, Settings};
use senescyt_lookup::ocr::{OcrBackend, OcrError};
use senescyt_lookup::page::PageAutomation;

/// What the portal shows after a search click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    WrongCaptcha,
    NoResults,
    Table,
    Blank,
}

/// One scripted captcha screenshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shot {
    /// Bytes written to the screenshot path.
    Image(Vec<u8>),
    /// The screenshot call fails.
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Goto(String),
    Reload,
    Fill(String, String),
    Remove(String),
    Click(String),
    Screenshot,
}

#[derive(Default)]
struct PageState {
    shots: VecDeque<Shot>,
    last_capture: Vec<u8>,
    responses: VecDeque<Response>,
    showing: Option<Response>,
    actions: Vec<Action>,
    content_calls: usize,
}

/// In-memory lookup form driven by a script of captures and responses.
pub struct FakePage {
    contract: DomContract,
    html: String,
    state: Mutex<PageState>,
}

impl FakePage {
    pub fn new(captures: Vec<Vec<u8>>, responses: Vec<Response>) -> Self {
        Self::scripted(captures.into_iter().map(Shot::Image).collect(), responses)
    }

    /// Like [`FakePage::new`], with screenshot failures in the script.
    /// Once the script runs out the last image is repeated.
    pub fn scripted(shots: Vec<Shot>, responses: Vec<Response>) -> Self {
        Self {
            contract: DomContract::default(),
            html: results_html(),
            state: Mutex::new(PageState {
                shots: shots.into(),
                responses: responses.into(),
                ..Default::default()
            }),
        }
    }

    /// A page already showing `response`, for classifier tests.
    pub fn showing(response: Response) -> Self {
        let page = Self::new(Vec::new(), Vec::new());
        page.state.lock().unwrap().showing = Some(response);
        page
    }

    pub fn actions(&self) -> Vec<Action> {
        self.state.lock().unwrap().actions.clone()
    }

    pub fn count(&self, pred: impl Fn(&Action) -> bool) -> usize {
        self.actions().iter().filter(|a| pred(a)).count()
    }

    pub fn reloads(&self) -> usize {
        self.count(|a| *a == Action::Reload)
    }

    pub fn screenshots(&self) -> usize {
        self.count(|a| *a == Action::Screenshot)
    }

    pub fn removals(&self) -> usize {
        let messages = self.contract.error_messages.clone();
        self.count(|a| *a == Action::Remove(messages.clone()))
    }

    pub fn submissions(&self) -> usize {
        let search = self.contract.search_button.clone();
        self.count(|a| *a == Action::Click(search.clone()))
    }

    /// Values typed into the captcha field, in order.
    pub fn submitted_captchas(&self) -> Vec<String> {
        self.actions()
            .into_iter()
            .filter_map(|a| match a {
                Action::Fill(selector, value) if selector == self.contract.captcha_input => {
                    Some(value)
                }
                _ => None,
            })
            .collect()
    }

    pub fn content_calls(&self) -> usize {
        self.state.lock().unwrap().content_calls
    }

    fn log(&self, action: Action) {
        self.state.lock().unwrap().actions.push(action);
    }
}

#[async_trait]
impl PageAutomation for FakePage {
    async fn goto(&self, url: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.showing = None;
        state.actions.push(Action::Goto(url.to_string()));
        Ok(())
    }

    async fn reload(&self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.showing = None;
        state.actions.push(Action::Reload);
        Ok(())
    }

    async fn fill(&self, selector: &str, value: &str) -> Result<()> {
        self.log(Action::Fill(selector.to_string(), value.to_string()));
        Ok(())
    }

    async fn remove(&self, selector: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let is_message = matches!(
            state.showing,
            Some(Response::WrongCaptcha) | Some(Response::NoResults)
        );
        if selector == self.contract.error_messages && is_message {
            state.showing = None;
        }
        state.actions.push(Action::Remove(selector.to_string()));
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if selector == self.contract.search_button {
            state.showing = Some(state.responses.pop_front().unwrap_or(Response::Blank));
        }
        state.actions.push(Action::Click(selector.to_string()));
        Ok(())
    }

    async fn screenshot_element(&self, selector: &str, path: &Path) -> Result<()> {
        assert_eq!(selector, self.contract.captcha_image);
        let bytes = {
            let mut state = self.state.lock().unwrap();
            state.actions.push(Action::Screenshot);
            match state.shots.pop_front() {
                Some(Shot::Image(next)) => state.last_capture = next,
                Some(Shot::Error) => anyhow::bail!("Element not found: {}", selector),
                None => {}
            }
            state.last_capture.clone()
        };
        std::fs::write(path, bytes)?;
        Ok(())
    }

    async fn query_text(&self, selector: &str, _wait: Duration) -> Result<Option<String>> {
        if selector != self.contract.error_messages {
            return Ok(None);
        }
        let text = match self.state.lock().unwrap().showing {
            Some(Response::WrongCaptcha) => Some("Caracteres incorrectos"),
            Some(Response::NoResults) => Some("No se encontraron resultados"),
            _ => None,
        };
        Ok(text.map(str::to_string))
    }

    async fn query_count(&self, selector: &str) -> Result<usize> {
        let showing = self.state.lock().unwrap().showing;
        Ok(usize::from(
            selector == self.contract.results_table && showing == Some(Response::Table),
        ))
    }

    async fn content(&self) -> Result<String> {
        self.state.lock().unwrap().content_calls += 1;
        Ok(self.html.clone())
    }
}

/// Recognizer that replays a script of answers, repeating the last one.
pub struct FakeOcr {
    answers: Mutex<VecDeque<String>>,
    last: Mutex<String>,
    /// For each call: whether the image it was given was pure black/white.
    calls: Mutex<Vec<bool>>,
    seen: Mutex<Vec<PathBuf>>,
    /// Zero-based call numbers that fail instead of answering.
    failing: Vec<usize>,
}

impl FakeOcr {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: Mutex::new(answers.iter().map(|s| s.to_string()).collect()),
            last: Mutex::new(String::new()),
            calls: Mutex::new(Vec::new()),
            seen: Mutex::new(Vec::new()),
            failing: Vec::new(),
        }
    }

    /// Make the given calls (zero-based) fail without consuming an answer.
    pub fn failing_on(mut self, calls: &[usize]) -> Self {
        self.failing = calls.to_vec();
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn all_inputs_binary(&self) -> bool {
        self.calls.lock().unwrap().iter().all(|b| *b)
    }

    pub fn seen(&self) -> Vec<PathBuf> {
        self.seen.lock().unwrap().clone()
    }
}

impl OcrBackend for FakeOcr {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn availability_hint(&self) -> String {
        String::new()
    }

    fn run_ocr(&self, image_path: &Path) -> Result<String, OcrError> {
        let img = image::open(image_path)
            .map_err(|e| OcrError::OcrFailed(e.to_string()))?
            .to_luma8();
        let call = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(img.pixels().all(|p| p[0] == 0 || p[0] == 255));
            calls.len() - 1
        };
        self.seen.lock().unwrap().push(image_path.to_path_buf());
        if self.failing.contains(&call) {
            return Err(OcrError::OcrFailed("scripted failure".to_string()));
        }

        let mut last = self.last.lock().unwrap();
        if let Some(next) = self.answers.lock().unwrap().pop_front() {
            *last = next;
        }
        Ok(format!(" {}\n", last))
    }
}

/// PNG bytes of a small noisy captcha-like image; distinct seeds differ.
pub fn captcha_png(seed: u32) -> Vec<u8> {
    let img = GrayImage::from_fn(40, 16, |x, y| {
        if (x * seed + y * 3) % 7 < 2 {
            Luma([40])
        } else {
            Luma([220])
        }
    });
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageLuma8(img)
        .write_to(&mut buf, ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

/// Default settings with a scratch work dir and no pacing delays.
pub fn test_settings(work_dir: &Path) -> Settings {
    let mut settings = Settings::default();
    settings.solver.work_dir = work_dir.to_path_buf();
    settings.solver.reload_pause_ms = 0;
    settings.solver.error_wait_ms = 10;
    settings
}

/// Results page with one degree table.
pub fn results_html() -> String {
    r#"<html><body><form id="formPrincipal">
        <table id="formPrincipal:j_idt52">
          <thead><tr>
            <th>Título</th><th>Institución de Educación Superior</th><th>Tipo</th>
            <th>Reconocido Por</th><th>Número de Registro</th><th>Fecha de Registro</th>
            <th>Área o Campo de Conocimiento</th><th>Observación</th>
          </tr></thead>
          <tbody><tr>
            <td>INGENIERO EN SISTEMAS</td><td>UNIVERSIDAD DE CUENCA</td><td>Nacional</td>
            <td></td><td>1002-2012-1234567</td><td>2012-09-14</td>
            <td>Ingeniería, Industria y Construcción</td><td></td>
          </tr></tbody>
        </table>
    </form></body></html>"#
        .to_string()
}
