//! Route guards.
//!
//! A guard is an async predicate over the app context. When it resolves
//! false the router drops the navigation silently; the guard itself is
//! responsible for user feedback and any redirect.

use futures_util::future::LocalBoxFuture;

use crate::components::toast;
use crate::context::AppContext;

pub fn require_auth(ctx: AppContext) -> LocalBoxFuture<'static, bool> {
    Box::pin(async move {
        if ctx.session.is_authenticated() {
            return true;
        }
        toast::info("Please sign in to continue");
        ctx.navigator.go("/login");
        false
    })
}

pub fn require_admin(ctx: AppContext) -> LocalBoxFuture<'static, bool> {
    Box::pin(async move {
        if !ctx.session.is_authenticated() {
            toast::info("Please sign in to continue");
            ctx.navigator.go("/login");
            return false;
        }
        if ctx.session.is_admin() {
            return true;
        }
        toast::error("You do not have access to that page");
        ctx.navigator.go("/");
        false
    })
}
