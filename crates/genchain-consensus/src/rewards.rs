//! Block finalization rewards: miner, uncles, and the ecosystem fund.
//!
//! Every block credits the miner, any referenced uncles, and a fixed list
//! of one hundred ecosystem addresses. The bases halve at each boundary of
//! [`HALVING_BOUNDARIES`] and all payouts stop once cumulative issuance
//! reaches the supply cap. Payout order is part of consensus: uncles in
//! reference order, then the miner, then the ecosystem list in table order.

use crate::chain_params::{
    COIN, GEN_BLOCK_ECO_REWARD, GEN_BLOCK_REWARD, GEN_BLOCK_UNCLE_REWARD, HALVING_BOUNDARIES,
    TOTAL_COIN,
};
use genchain_types::{Address, Header, StateAccess};
use num_bigint::BigUint;
use once_cell::sync::Lazy;
use tracing::debug;

/// The ecosystem fund: one hundred addresses credited on every block.
const ECOSYSTEM_HEX: [&str; 100] = [
    "0x49ff31917cd16c593d376347f82f7ea67a7ded0d",
    "0x6e2aeaa5d6bbd27656aa8c774005e71d9afc1b23",
    "0x80960290c3e717ba425333219e2b4a64c9184422",
    "0xde0e25c523a107fc71a955288e95fc80e74d114b",
    "0x6c8df9d21c7087125f448016a2f2afcc14bb8c32",
    "0xc21581f15ffe2da6ac5e2efc04cefd5f6ba8c121",
    "0xaf524d5a4aedef7e4ab6580b68f4bbfcd7ed9064",
    "0x8f1eeeade57c518f561169e9e473b6737410106d",
    "0x283d14e63bb224923d92c0a3e20d8d0f8554fdc6",
    "0x1edc6edcb4456badbe2f84ea2868439467303f39",
    "0x35a93c4ba8ae10156950a9a760a922b990223f7e",
    "0xf7922e6085dbb8f9af7b998647bf52a8a67323ea",
    "0xaea94a6c6436c181e976423fca23a2fc58ff0e0e",
    "0xbff99ec8cbf9cd3d27a5a41ab22bf9a1841b658c",
    "0x5e4d01a8b2f4f4385a396f0276090ce9ba70fbec",
    "0xf72afb5b6b87516b96440665b0efef3b466f2c8f",
    "0xc970baa3fe0f050628803560c4f4763a8cb89641",
    "0x72508937ac5d4ea2dfdce7885480eca36a4a23fa",
    "0x9f8136bd79512e809f90ce0c1e451b0d6991aa63",
    "0xa4f36136865312bb5e0d42aed529126f09bb1b02",
    "0x3df38e8fbf2bc869afdec75ceeb25cf470b047e1",
    "0xbc88ffcc81bdb180f74a0590e8586d147ed1ed85",
    "0x771554d5a2cb453f4ed459b830ed4011fb8ce68a",
    "0x127426bed3724449b9efc1da7058f00498c0338d",
    "0x4e1a6355a35466b6cc1b02492795814128a56799",
    "0xd934cdf46a7ac61ce91ebaa92bc20afb68c9b566",
    "0xac2bcd2ed9876051d4c64dd899d38f95e68bdce7",
    "0x6f20fddfdbb96b9516dd9b75fc54c75595581cb3",
    "0x39136041c26225e97dc55bf897881280258722ea",
    "0x9ab1c0ed107c5e3521ca017f3011cbd6cf856202",
    "0x7520afef96fecc57884449b14beca134cbafbed8",
    "0x78b0472be31df30b4c02f83108661f1adc99abd7",
    "0xfd5da58f901548cb0e06a0d74c3d3f9dead8831f",
    "0x17c38c7c4258d9bb75165c828ed0394933b87b28",
    "0x0a50575359efbad65c4c68f71906d663185138bc",
    "0x59f8c5d60d80dcd06add171a09182f9764e58e6a",
    "0x01a24c4e8b82b3c1838d9f4d8b6a8070eeae06b3",
    "0x589ab7907f14d05488c029a362b5f1aeeb9d2d3e",
    "0x201a14780fef99e5793b2da30b4cc5d41c3d51e8",
    "0xde4597c58fa29b7642c317c9a6575fcea8c8f32a",
    "0x73cd1b163c038629cf57987405dfaf964452024a",
    "0x7ebc3ea0ec38c99d76d13cc618760a28a241910f",
    "0xff344df8352209e4a841a95d890695de45dfdfb2",
    "0xbaaa990b7abeb0fc3587dfb446c9f27897daaa07",
    "0x1d07362846ab350377de07efa65126671354716b",
    "0x461a2f4ae6d1651a5279d4d551dc457d6ddce9e1",
    "0xda1a349c67e15c0cdeaeef1cf54041a37652f86e",
    "0x70a7bafcd8b9bfdd1bad2a1099acdc324eebd816",
    "0x4e9ff86bcbfab42d07cc143a8d1775c94010a9bb",
    "0x1cebf431b95076254687a385ccb03aca80c3d543",
    "0x0ebd62ba3e7dea2fef3c583cab94ba32271cfad9",
    "0x86a08724ca02071a93401428bd5c37e827db8c1b",
    "0x0932388681886fe81dce06fa5b50ecda0af6d22b",
    "0x011ed29043ecfe7176ab06879f9475dab260e3f8",
    "0x4e6d3140de836c33828d7cafabbb24b0a0263bc7",
    "0x7cc171a2018dc46a3b22e8905811e31a508cdc5a",
    "0x0911306e8e46bf03e862c0ca39e9eb4d9f175527",
    "0x9bb2fcfe40cfe79788d9daf654f9e5e660376880",
    "0xfa3959dd6925bdf634a19fcf9fc9a74a852b02f1",
    "0x72165c2c6ef16d8b972567d4e4c45f8cfd2f13c3",
    "0x45e1e09ba41644465532b5ed6c439ac6dfe23f59",
    "0x841111d1fe42be7b96e6689e9c94497dc32e3c9d",
    "0x353ae2b4bc037d15e4d08ec2fa18907514e019a2",
    "0x19c4b8d1d4a4d20f0b56163c169f60a851f2956c",
    "0xc02cb1a2ca0f72a5fc0f9798035bf62c381d8e11",
    "0x020758e61bbb5fa332f2c67f0e031d6fcadd6149",
    "0xfffee9d11fb0dd82a57013c74299d604b0bb753e",
    "0x5d1d57a929edf499f0769087827f7b86a67b8183",
    "0xb7d9930658124b685bf2bcbd47aea22541c0c5d0",
    "0x99a64c829f5a4c5afbc0a4ea66af2fde060b4ee6",
    "0x5054afce04f7e1b8dcbb388542b4eba7e140d9c8",
    "0x1b29d583468302df6431571d38273b970c3617dc",
    "0x3dc69c6d5ce802a43ed363628d76beebf50b51f8",
    "0xb9953e7213c9529f01de7bb5088eb6f77cb5605b",
    "0xf60b8609a8324fa2f20175091bf57eb81f9c0deb",
    "0xf07303b8a84968fdec7904c9741c2d54a4b40579",
    "0x44b8b9105521616e90b19c6f10e0323513bc4fea",
    "0xecbc2130bbf9336c22e5130984e21a0fb56334e8",
    "0xed6862dcda5acebab0eda74eacddc6d4f8b40f31",
    "0x80eb5e105f5ffd16c0a3ef0b647e89f1ebeb3e72",
    "0xe7c0a7ea3099b868e4cd416bc41cea95929ccdf1",
    "0x5b39ca60ae3a3f74e4dd47049473482cf3145461",
    "0x242fdc1c4d04e294c7293790a177b2b2cebf1fef",
    "0x487274989a7e160ffc67a693f79d1fd09c524b92",
    "0x870021e24661347469a9b7e13f35c3b4e7e37357",
    "0x4ce7c5fa93f682eb880b8dab8517b1a45e49c662",
    "0x225ac4ee12c29db337a0bf7367d2a78291392648",
    "0x54bf50a802423235915f44979c03d68d7ed3a147",
    "0xef55b38f55ed2add70ce0d441598e9f8dbb27285",
    "0x094b59b08c7495b4eada733df3a3a095047859d4",
    "0x2f639e3629970dca3348628d86d2030726d53ccf",
    "0x1e2beefabfd14cb0bb92f5c3c2515a5616481872",
    "0xb81bcc9e4a53bf504df2567afa86633277e9ec98",
    "0x869ee88333c26633c06747bbcee9bfc1fcc29989",
    "0xaf758dab0efcd9b390013dbca01f61121c5c7e21",
    "0x2104d5b752ae7d26ed60ed12d2cba63cffcb981e",
    "0x45ae3870bdba9d754515ee912f0888b7d6e0a20b",
    "0xeb95f9470258df6a9d50dc644003869cb77dca03",
    "0xf588736008ca9084c687993f543435e0e15a2852",
    "0x9a3e8cb939b9ea72f18079d0a3639ce380b2cd31",
];

/// Parsed ecosystem address table, in payout order.
pub static ECOSYSTEM_ADDRESSES: Lazy<Vec<Address>> = Lazy::new(|| {
    ECOSYSTEM_HEX
        .iter()
        .map(|entry| entry.parse().expect("ecosystem address table entry"))
        .collect()
});

/// The per-recipient reward bases active for one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardBase {
    /// Miner base reward.
    pub miner: BigUint,
    /// Per-uncle reward.
    pub uncle: BigUint,
    /// Reserved lane, always zero.
    pub reserved: BigUint,
    /// Per-ecosystem-address reward.
    pub eco: BigUint,
}

impl RewardBase {
    fn zero() -> Self {
        Self {
            miner: BigUint::from(0u32),
            uncle: BigUint::from(0u32),
            reserved: BigUint::from(0u32),
            eco: BigUint::from(0u32),
        }
    }
}

/// Total issuance cap in wei.
pub fn supply_cap() -> BigUint {
    BigUint::from(TOTAL_COIN) * BigUint::from(COIN)
}

/// Halving shift for a block height: zero through the first boundary, then
/// one more per boundary crossed, saturating at seven.
fn halving_shift(number: u64) -> u32 {
    HALVING_BOUNDARIES
        .iter()
        .position(|boundary| number <= *boundary)
        .unwrap_or(HALVING_BOUNDARIES.len()) as u32
}

/// Reward bases for the block, honoring the halving schedule and the
/// supply cap.
pub fn reward_base(header: &Header) -> RewardBase {
    if header.rewards >= supply_cap() {
        return RewardBase::zero();
    }
    let shift = halving_shift(header.number);
    RewardBase {
        miner: BigUint::from(GEN_BLOCK_REWARD >> shift),
        uncle: BigUint::from(GEN_BLOCK_UNCLE_REWARD >> shift),
        reserved: BigUint::from(0u32),
        eco: BigUint::from(GEN_BLOCK_ECO_REWARD >> shift),
    }
}

/// Credit all block rewards into `state` and fold them into the header's
/// cumulative issuance counter.
pub fn accumulate_rewards(state: &mut dyn StateAccess, header: &mut Header, uncles: &[Header]) {
    let base = reward_base(header);

    let mut uncle_total = BigUint::from(0u32);
    for uncle in uncles {
        state.add_balance(&uncle.coinbase, &base.uncle);
        uncle_total += &base.uncle;
    }

    // the miner picks up a sixth of what the uncles drew
    let bonus = &uncle_total / BigUint::from(6u32);
    let miner_total = &base.miner + &bonus;
    state.add_balance(&header.coinbase, &miner_total);

    let mut eco_total = BigUint::from(0u32);
    for address in ECOSYSTEM_ADDRESSES.iter() {
        state.add_balance(address, &base.eco);
        eco_total += &base.eco;
    }

    let issued = &miner_total + &eco_total + &uncle_total;
    debug!(number = header.number, issued = %issued, "block rewards accumulated");
    header.rewards += issued;
}
