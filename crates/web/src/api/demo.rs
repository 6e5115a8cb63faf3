//! Small demo site exercising sessions, bodies and redirects.

use async_trait::async_trait;
use axum::http::StatusCode;

use crate::context::RequestContext;
use crate::dispatch::Handler;
use crate::transport::AxumTransport;

type Ctx = RequestContext<AxumTransport>;

/// `GET /`: counts visits per session.
pub struct Home;

#[async_trait]
impl Handler for Home {
    async fn handle(&self, ctx: &mut Ctx) -> anyhow::Result<()> {
        let session = ctx.session().clone();
        let visits = session.get_setting("visits").parse::<u64>().unwrap_or(0) + 1;
        session.set_setting("visits", visits.to_string());

        let html = format!(
            "<!DOCTYPE html>\n<html><head><title>zweb</title></head><body>\
             <h1>Hello</h1><p>Visit number {visits} in this session.</p>\
             <p>Request #{seq}</p></body></html>",
            seq = ctx.seq(),
        );
        ctx.reply(html, "html");
        Ok(())
    }
}

/// `/echo`: sends the request body back as plain text.
pub struct Echo;

#[async_trait]
impl Handler for Echo {
    async fn handle(&self, ctx: &mut Ctx) -> anyhow::Result<()> {
        let body = ctx.try_post_data().await?;
        ctx.reply(body, "txt");
        Ok(())
    }
}

/// `/settings/:name`: `GET` reads a session setting, `POST`/`PUT`
/// stores the request body under it.
pub struct Setting;

#[async_trait]
impl Handler for Setting {
    async fn handle(&self, ctx: &mut Ctx) -> anyhow::Result<()> {
        let href = ctx.href();
        let name = href.strip_prefix("settings/").unwrap_or_default().to_owned();
        if name.is_empty() || name.contains('/') {
            ctx.reply_with_status(StatusCode::BAD_REQUEST, "bad setting name", "txt");
            return Ok(());
        }

        match ctx.method().as_str() {
            "GET" => {
                let value = ctx.session().get_setting(&name);
                ctx.reply(value, "txt");
            }
            "POST" | "PUT" => {
                let body = ctx.try_post_data().await?;
                let value = String::from_utf8(body.to_vec())?;
                ctx.session().set_setting(name, value.trim());
                ctx.reply_with_status(StatusCode::NO_CONTENT, "", "txt");
            }
            _ => ctx.reply_with_status(StatusCode::METHOD_NOT_ALLOWED, "", "txt"),
        }
        Ok(())
    }
}

/// `GET /back`: redirects to the referring page, or home.
pub struct Back;

#[async_trait]
impl Handler for Back {
    async fn handle(&self, ctx: &mut Ctx) -> anyhow::Result<()> {
        let target = match ctx.header("referer") {
            Some(r) if !r.trim().is_empty() => r.trim().to_owned(),
            _ => "/".to_owned(),
        };
        ctx.redirect(&target);
        Ok(())
    }
}

pub struct NotFound;

#[async_trait]
impl Handler for NotFound {
    async fn handle(&self, ctx: &mut Ctx) -> anyhow::Result<()> {
        let msg = format!("no page at /{}", ctx.href());
        ctx.reply_with_status(StatusCode::NOT_FOUND, msg, "txt");
        Ok(())
    }
}
