use std::collections::HashMap;
use std::env;
use std::sync::Arc;

use async_trait::async_trait;
use gadgets::{
    FetchRequest, FetchResponse, Fetcher, GadgetConfig, GadgetError, Gadgets, Locale,
    RenderRequest,
};
use url::Url;

const GADGET: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Module>
  <ModulePrefs title="__MSG_title__" author="demo">
    <Locale messages="messages/all_ALL.xml"/>
    <Locale lang="de" messages="messages/de_ALL.xml"/>
    <Locale lang="he" language_direction="rtl">
      <msg name="greeting">שלום</msg>
    </Locale>
  </ModulePrefs>
  <UserPref name="name" display_name="Name" default_value="stranger"/>
  <Content type="html"><![CDATA[
    <p dir="__BIDI_DIR__" style="text-align:__BIDI_START_EDGE__">__MSG_greeting__, __UP_name__!</p>
  ]]></Content>
</Module>"#;

const ALL_ALL: &str = r#"<messagebundle>
  <msg name="title">Greeter</msg>
  <msg name="greeting">Hello</msg>
</messagebundle>"#;

const DE_ALL: &str = r#"<messagebundle>
  <msg name="greeting">Hallo</msg>
</messagebundle>"#;

/// Serves a fixed set of documents from memory.
struct MemoryOrigin {
    documents: HashMap<String, &'static str>,
}

#[async_trait]
impl Fetcher for MemoryOrigin {
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse, GadgetError> {
        match self.documents.get(request.url.as_str()) {
            Some(body) => Ok(FetchResponse::ok(*body)),
            None => Ok(FetchResponse::with_status(404, "")),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    let locale: Locale = env::args().nth(1).unwrap_or_else(|| "en_US".into()).parse()?;
    let name = env::args().nth(2);

    let base = Url::parse("http://gadgets.example.org/greeter/")?;
    let spec_url = base.join("spec.xml")?;
    let documents = HashMap::from([
        (spec_url.to_string(), GADGET),
        (base.join("messages/all_ALL.xml")?.to_string(), ALL_ALL),
        (base.join("messages/de_ALL.xml")?.to_string(), DE_ALL),
    ]);
    let gadgets = Gadgets::new(Arc::new(MemoryOrigin { documents }), GadgetConfig::default());

    let mut request = RenderRequest::new(spec_url).locale(locale.clone()).module_id(1);
    if let Some(name) = name {
        request = request.user_pref("name", name);
    }
    let rendered = gadgets.render(&request).await?;
    println!("[{locale}] {}", rendered.module_prefs().title());
    if let Some(view) = rendered.view("default") {
        println!("{}", view.content().trim());
    }
    Ok(())
}
