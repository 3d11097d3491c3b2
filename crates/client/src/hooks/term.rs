use super::{Busy, require_id, store};
use crate::{
    context::AppContext,
    error::Result,
    keys,
    notify::Notice,
    resource::{Access, Resource},
};
use futures::join;
use models::{
    Term,
    forms::{TermForm, Validate},
};
use serde_json::Value;
use std::ops::Deref;

/// Every term
pub type TermsHook = Resource<Vec<Term>>;

/// The term in session today, as decided by the server
pub type CurrentTermHook = Resource<Term>;

/// A single term with its edit actions
#[derive(Clone)]
pub struct TermHook {
    resource: Resource<Term>,
    term_id: Option<String>,
    is_updating: Busy,
    is_removing: Busy,
}

impl AppContext {
    pub fn terms(&self) -> TermsHook {
        Resource::new(self.clone(), Some(keys::TERMS.to_owned()), Access::Public)
    }

    pub fn current_term(&self) -> CurrentTermHook {
        Resource::new(self.clone(), Some(keys::CURRENT_TERM.to_owned()), Access::Public)
    }

    pub fn term(&self, term_id: Option<&str>) -> TermHook {
        let term_id = term_id.filter(|id| !id.is_empty()).map(str::to_owned);
        TermHook {
            resource: Resource::new(
                self.clone(),
                term_id.as_deref().map(keys::term),
                Access::Authenticated,
            ),
            term_id,
            is_updating: Busy::default(),
            is_removing: Busy::default(),
        }
    }
}

impl Deref for TermHook {
    type Target = Resource<Term>;

    fn deref(&self) -> &Self::Target {
        &self.resource
    }
}

impl TermHook {
    pub fn is_updating(&self) -> bool {
        self.is_updating.get()
    }

    pub fn is_removing(&self) -> bool {
        self.is_removing.get()
    }

    /// Saves an edited term, then refreshes the term list
    pub async fn update(&self, form: &TermForm) -> Result<Option<Term>> {
        form.validate()?;
        let ctx = self.context();
        let key = keys::term(require_id(&self.term_id, "term")?);
        let client = ctx.authed_client()?;

        let _busy = self.is_updating.enter();
        let body = ctx.report(client.put::<_, Option<Value>>(&key, form).await, "Submission Error")?;

        let term = store::<Term>(ctx.cache(), &key, body).await;
        ctx.cache().revalidate(keys::TERMS).await;

        ctx.notify(Notice::success("Term Updated"));
        Ok(term)
    }

    /// Deletes the term and drops it from every cached view
    pub async fn remove(&self) -> Result<()> {
        let ctx = self.context();
        let key = keys::term(require_id(&self.term_id, "term")?);
        let client = ctx.authed_client()?;

        let _busy = self.is_removing.enter();
        ctx.report(client.delete(&key).await, "Error Deleting Term")?;

        let cache = ctx.cache();
        cache.tombstone(&key);
        join!(
            cache.revalidate(keys::TERMS),
            cache.revalidate(keys::CURRENT_TERM)
        );

        ctx.notify(Notice::success("Term Deleted"));
        Ok(())
    }
}
